use crate::model::LessonPhase;

/// Static body text for the pages that carry no interactive controls.
/// Interactive pages (setup, hypothesis, experiment, observation, analysis,
/// evaluation) add their own widgets below this text.
pub(crate) fn page_text(phase: LessonPhase) -> &'static [&'static str] {
    match phase {
        LessonPhase::Theory => &[
            "Kazanım",
            "  Bazı katı maddelerin ısıtıldığında doğrudan gaza geçebildiğini",
            "  (süblimleşme) ve bu gazın soğuk yüzeyde doğrudan katılaşabildiğini",
            "  (kırağılaşma/depozisyon) gözlemler ve açıklar.",
            "",
            "Amaç",
            "  Naftalin örneğini ısıtarak süblimleşmesini, üstteki soğuk cam",
            "  yüzeyinde ise kırağılaşmasını gözlemek.",
        ],
        LessonPhase::Materials => &[
            "Temel Malzemeler",
            "  • Naftalin parçası      Süblimleşecek madde",
            "  • Beher (250 mL)        Ana deney kabı",
            "  • Saat camı             Kristalleşme yüzeyi",
            "  • İspirto ocağı         Isıtma kaynağı",
            "",
            "Yardımcı Malzemeler",
            "  • Üçayak + tel ızgara   Beher desteği",
            "  • Maşa                  Güvenli tutma",
            "  • Buz parçaları         Soğutma için",
            "  • Güvenlik ekipmanları  Gözlük, eldiven, önlük",
        ],
        LessonPhase::Safety => &[
            "Güvenlik Kuralları",
            "  ! Naftalin uçucu ve sağlığa zararlı olabilir; koklamayın, ağza götürmeyin.",
            "  ! Açık alev kullanıldığı için yanıcı maddelerden uzak çalışın.",
            "  ! Gözlük, önlük ve eldiven takın.",
            "  ! Sıcak cam soğuk görünebilir, maşa ile tutulmalı.",
            "  ! Deney bitince ocağı söndürün, alanı temizleyin.",
        ],
        LessonPhase::Variables => &[
            "Bağımsız Değişken",
            "  Isıtma süresi / alev şiddeti (kontrol ettiğimiz faktör)",
            "",
            "Bağımlı Değişken",
            "  Maddede gözlenen hal değişimleri (ölçtüğümüz sonuç)",
            "",
            "Kontrol Değişkenleri",
            "  • Madde miktarı   • Camların mesafesi   • Ortam sıcaklığı",
        ],
        LessonPhase::Setup => &[
            "Kurulum Adımları",
            "  1. Beheri üçayak üzerine yerleştirin",
            "  2. Beherin tabanına küçük bir naftalin parçası koyun",
            "  3. Beherin ağzını saat camıyla kapatın",
            "  4. İspirto ocağını beherin altına alın",
            "  5. Güvenlik ekipmanlarını takın",
        ],
        LessonPhase::Hypothesis => &["Sizce naftalin ısıtıldığında ne olur?"],
        LessonPhase::Experiment => &[],
        LessonPhase::Observation => &["Deney sırasında kaydedilen gözlemler:"],
        LessonPhase::Analysis => &[
            "Isıtma: Katı → Gaz (Süblimleşme) gerçekleşti",
            "Soğutma: Gaz → Katı (Kırağılaşma) gerçekleşti",
        ],
        LessonPhase::Errors => &[
            "Hata 1: Saat camı yeterince soğuk değilse kristaller az oluşur",
            "  Çözüm:  Daha fazla buz kullanın veya saat camını önceden soğutun",
            "  Önleme: Buz eklemeyi süblimleşme başladıktan sonra yapın",
            "",
            "Hata 2: Alev çok yüksekse buhar hızlı kaçar ve gözlem zorlaşır",
            "  Çözüm:  Orta şiddette alev kullanın (%40-60 arası)",
            "  Önleme: Isıtmayı kademeli olarak artırın",
        ],
        LessonPhase::Evaluation => &["Anlayış Kontrol Soruları"],
    }
}

pub(crate) struct ReviewQuestion {
    pub(crate) question: &'static str,
    pub(crate) hint: &'static str,
    pub(crate) sample_answer: &'static str,
}

pub(crate) const REVIEW_QUESTIONS: [ReviewQuestion; 2] = [
    ReviewQuestion {
        question: "Süblimleşme nedir? Tanımlayınız.",
        hint: "Hal değişimi türünü düşünün",
        sample_answer: "Katı maddelerin sıvı fazını atlayarak doğrudan gaz haline geçmesi olayıdır.",
    },
    ReviewQuestion {
        question: "Günlük hayattan süblimleşme örneği veriniz.",
        hint: "Evde kullandığınız maddeler",
        sample_answer: "Naftalin topları, kuru buz, iyot kristalleri, kar tanelerinin buharlaşması.",
    },
];

pub(crate) fn hypothesis_feedback(correct: bool) -> &'static str {
    if correct {
        "Tebrikler! Hipoteziniz doğru: Naftalin doğrudan katıdan gaza geçti (süblimleşme)."
    } else {
        "Gözlemler, naftalinin 80°C üzerinde süblimleştiğini gösteriyor. Doğru cevap: Doğrudan katıdan gaza geçer (süblimleşme)."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_static_page_has_text() {
        for phase in LessonPhase::ALL {
            if phase != LessonPhase::Experiment {
                assert!(!page_text(phase).is_empty(), "{:?} has no text", phase);
            }
        }
    }
}
