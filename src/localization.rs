//! Widget and countdown texts in the app's three languages

use crate::constants::KEY_WIDGET_LOCALE;
use crate::prayer::PrayerId;
use crate::prefs::{read_string, PreferenceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Tr,
    En,
    Ar,
}

const ARABIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

impl Locale {
    /// Unknown codes fall back to Turkish
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "en" => Locale::En,
            "ar" => Locale::Ar,
            _ => Locale::Tr,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::Tr => "tr",
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    /// Locale selected in the app (`nv_widget_locale`)
    pub fn from_store<S: PreferenceStore + ?Sized>(store: &S) -> Self {
        read_string(store, KEY_WIDGET_LOCALE)
            .map(|code| Self::from_code(&code))
            .unwrap_or_default()
    }

    pub fn calculating(self) -> &'static str {
        match self {
            Locale::Tr => "Vakit hesaplanıyor",
            Locale::En => "Calculating time",
            Locale::Ar => "جاري حساب الوقت",
        }
    }

    /// Suffix after the prayer name in the widget title ("Öğle vaktine")
    pub fn next_prayer_suffix(self) -> &'static str {
        match self {
            Locale::Tr => "vaktine",
            Locale::En => "time",
            Locale::Ar => "وقت",
        }
    }

    pub fn loading(self) -> &'static str {
        match self {
            Locale::Tr => "Yükleniyor...",
            Locale::En => "Loading...",
            Locale::Ar => "جاري التحميل...",
        }
    }

    pub fn hour(self) -> &'static str {
        match self {
            Locale::Tr => "saat",
            Locale::En => "hour",
            Locale::Ar => "ساعة",
        }
    }

    pub fn minute(self) -> &'static str {
        match self {
            Locale::Tr => "dakika",
            Locale::En => "minute",
            Locale::Ar => "دقيقة",
        }
    }

    pub fn minute_short(self) -> &'static str {
        match self {
            Locale::Tr => "dk",
            Locale::En => "min",
            Locale::Ar => "د",
        }
    }

    pub fn second(self) -> &'static str {
        match self {
            Locale::Tr => "saniye",
            Locale::En => "second",
            Locale::Ar => "ثانية",
        }
    }

    pub fn prayer_name(self, id: PrayerId) -> &'static str {
        match (self, id) {
            (Locale::Tr, PrayerId::Imsak) => "İmsak",
            (Locale::Tr, PrayerId::Gunes) => "Güneş",
            (Locale::Tr, PrayerId::Ogle) => "Öğle",
            (Locale::Tr, PrayerId::Ikindi) => "İkindi",
            (Locale::Tr, PrayerId::Aksam) => "Akşam",
            (Locale::Tr, PrayerId::Yatsi) => "Yatsı",
            (Locale::Tr, PrayerId::Cuma) => "Cuma",
            (Locale::Tr, PrayerId::Dua) => "Dua",
            (Locale::En, PrayerId::Imsak) => "Imsak",
            (Locale::En, PrayerId::Gunes) => "Sunrise",
            (Locale::En, PrayerId::Ogle) => "Zuhr",
            (Locale::En, PrayerId::Ikindi) => "Asr",
            (Locale::En, PrayerId::Aksam) => "Maghrib",
            (Locale::En, PrayerId::Yatsi) => "Isha",
            (Locale::En, PrayerId::Cuma) => "Jumuah",
            (Locale::En, PrayerId::Dua) => "Dua",
            (Locale::Ar, PrayerId::Imsak) => "الإمساك",
            (Locale::Ar, PrayerId::Gunes) => "الشروق",
            (Locale::Ar, PrayerId::Ogle) => "الظهر",
            (Locale::Ar, PrayerId::Ikindi) => "العصر",
            (Locale::Ar, PrayerId::Aksam) => "المغرب",
            (Locale::Ar, PrayerId::Yatsi) => "العشاء",
            (Locale::Ar, PrayerId::Cuma) => "الجمعة",
            (Locale::Ar, PrayerId::Dua) => "الدعاء",
        }
    }

    /// Translate a Turkish prayer name as the app caches it. Names that are
    /// not recognised are returned unchanged.
    pub fn translate_cached_name(self, turkish: &str) -> String {
        PrayerId::ALL
            .into_iter()
            .find(|id| Locale::Tr.prayer_name(*id) == turkish)
            .map(|id| self.prayer_name(id).to_string())
            .unwrap_or_else(|| turkish.to_string())
    }

    /// Digits in the locale's numeral system
    pub fn numerals(self, input: &str) -> String {
        if self != Locale::Ar {
            return input.to_string();
        }
        input
            .chars()
            .map(|c| match c.to_digit(10) {
                Some(d) => ARABIC_DIGITS[d as usize],
                None => c,
            })
            .collect()
    }

    /// "2saat 30dk", "45dakika", "12saniye"; seconds only appear in the last minute
    pub fn format_time_remaining(self, hours: i64, minutes: i64, seconds: i64) -> String {
        let mut parts = Vec::new();

        if hours > 0 {
            parts.push(format!("{}{}", self.numerals(&hours.to_string()), self.hour()));
        }
        if minutes > 0 {
            let unit = if hours > 0 {
                self.minute_short()
            } else {
                self.minute()
            };
            parts.push(format!("{}{}", self.numerals(&minutes.to_string()), unit));
        }
        if hours == 0 && minutes == 0 && seconds > 0 {
            parts.push(format!("{}{}", self.numerals(&seconds.to_string()), self.second()));
        }

        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;

    #[test]
    fn test_locale_from_store() {
        let store = MemoryStore::new();
        assert_eq!(Locale::from_store(&store), Locale::Tr);
        store.set("flutter.nv_widget_locale", "en".into());
        assert_eq!(Locale::from_store(&store), Locale::En);
        store.set("flutter.nv_widget_locale", "de".into());
        assert_eq!(Locale::from_store(&store), Locale::Tr);
    }

    #[test]
    fn test_format_time_remaining() {
        assert_eq!(Locale::Tr.format_time_remaining(2, 30, 10), "2saat 30dk");
        assert_eq!(Locale::Tr.format_time_remaining(0, 45, 10), "45dakika");
        assert_eq!(Locale::En.format_time_remaining(0, 0, 12), "12second");
        assert_eq!(Locale::En.format_time_remaining(3, 0, 0), "3hour");
        assert_eq!(Locale::Tr.format_time_remaining(0, 0, 0), "");
    }

    #[test]
    fn test_arabic_numerals() {
        assert_eq!(Locale::Ar.format_time_remaining(2, 30, 0), "٢ساعة ٣٠د");
        assert_eq!(Locale::En.numerals("12"), "12");
    }

    #[test]
    fn test_translate_cached_name() {
        assert_eq!(Locale::En.translate_cached_name("İkindi"), "Asr");
        assert_eq!(Locale::Ar.translate_cached_name("Yatsı"), "العشاء");
        assert_eq!(Locale::En.translate_cached_name("Teheccüd"), "Teheccüd");
    }
}
