// Notification texts shown when a prayer alarm fires

use crate::constants::{KEY_DUA_LAST_BODY, KEY_DUA_LAST_TITLE};
use crate::prayer::{DayOffset, PrayerId};
use crate::prefs::{read_string, PreferenceStore};

pub fn title_for(id: PrayerId) -> &'static str {
    match id {
        PrayerId::Imsak => "\u{1F305} İmsak Vakti",
        PrayerId::Gunes => "Güneş Doğuşu",
        PrayerId::Ogle => "Öğle Namazı",
        PrayerId::Ikindi => "İkindi Namazı",
        PrayerId::Aksam => "Akşam Namazı",
        PrayerId::Yatsi => "Yatsı Namazı",
        PrayerId::Cuma => "Cuma Namazı",
        PrayerId::Dua => "\u{1F932} Günün Duası",
    }
}

/// Body text; `minutes == 0` means "the time has come"
pub fn body_for(id: PrayerId, minutes: u32) -> String {
    if minutes == 0 {
        let text = match id {
            PrayerId::Imsak => "İmsak vakti girdi.",
            PrayerId::Gunes => "Güneş doğdu!",
            PrayerId::Ogle => "Öğle namazı vakti girdi.",
            PrayerId::Ikindi => "İkindi namazı vakti girdi.",
            PrayerId::Aksam => "Akşam namazı vakti girdi.",
            PrayerId::Yatsi => "Yatsı namazı vakti girdi.",
            PrayerId::Cuma => "Cuma namazı vakti girdi.",
            PrayerId::Dua => "Günün duası hazır.",
        };
        return text.to_string();
    }

    let lead = match id {
        PrayerId::Imsak => "İmsak vaktine",
        PrayerId::Gunes => "Güneş doğuşuna",
        PrayerId::Ogle => "Öğle namazına",
        PrayerId::Ikindi => "İkindi namazına",
        PrayerId::Aksam => "Akşam namazına",
        PrayerId::Yatsi => "Yatsı namazına",
        PrayerId::Cuma => "Cuma namazına",
        PrayerId::Dua => "Günün duasına",
    };
    format!("{lead} {minutes} dakika kaldı.")
}

/// Dua title: per-day override, then the last one the app showed, then the template
pub fn dua_title<S: PreferenceStore + ?Sized>(store: &S, day: DayOffset) -> String {
    read_string(store, &format!("nv_dua_title_dayOffset_{}", day as u8))
        .or_else(|| read_string(store, KEY_DUA_LAST_TITLE))
        .unwrap_or_else(|| title_for(PrayerId::Dua).to_string())
}

pub fn dua_body<S: PreferenceStore + ?Sized>(store: &S, day: DayOffset) -> String {
    read_string(store, &format!("nv_dua_body_dayOffset_{}", day as u8))
        .or_else(|| read_string(store, KEY_DUA_LAST_BODY))
        .unwrap_or_else(|| body_for(PrayerId::Dua, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;

    #[test]
    fn test_body_with_and_without_offset() {
        assert_eq!(body_for(PrayerId::Ikindi, 0), "İkindi namazı vakti girdi.");
        assert_eq!(body_for(PrayerId::Ikindi, 10), "İkindi namazına 10 dakika kaldı.");
    }

    #[test]
    fn test_dua_text_fallback_chain() {
        let store = MemoryStore::new();
        assert_eq!(dua_title(&store, DayOffset::Today), title_for(PrayerId::Dua));

        store.set("flutter.nv_dua_last_title", "Dün".into());
        assert_eq!(dua_title(&store, DayOffset::Tomorrow), "Dün");

        store.set("flutter.nv_dua_title_dayOffset_1", "Yarın".into());
        assert_eq!(dua_title(&store, DayOffset::Tomorrow), "Yarın");
        assert_eq!(dua_title(&store, DayOffset::Today), "Dün");

        store.set("nv_dua_body_dayOffset_0", "Rabbim...".into());
        assert_eq!(dua_body(&store, DayOffset::Today), "Rabbim...");
        assert_eq!(dua_body(&store, DayOffset::Tomorrow), "Günün duası hazır.");
    }
}
