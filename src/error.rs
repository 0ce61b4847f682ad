use thiserror::Error;

/// A refused intent. Shown to the learner as a notice; state is untouched.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub(crate) enum Blocked {
    #[error("Önce düzeneği tamamlayın.")]
    SetupIncomplete,
    #[error("Önce süblimleşmeyi bekleyin.")]
    NotEnoughVapor,
    #[error("Buz zaten eklendi.")]
    IceAlreadyAdded,
    #[error("Alev ayarı yalnızca ısıtma sırasında değiştirilebilir.")]
    HeatingInactive,
    #[error("Lütfen hipotezinizi seçiniz.")]
    HypothesisRequired,
    #[error("Bu malzeme zaten yerleştirildi.")]
    AlreadyPlaced,
}
