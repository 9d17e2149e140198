//! Roster Localization
//!
//! Fluent (FTL) based labels for placeholder slots and group banners

use fluent::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use fluent_langneg::{negotiate_languages, NegotiationStrategy};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

use crate::error::{LineupError, Result};
use crate::template::GroupId;

/// Supported locales
pub const SUPPORTED_LOCALES: &[&str] = &["en-US", "ja-JP", "ko-KR"];

pub const FALLBACK_LOCALE: &str = "en-US";

const EN_US_FTL: &str = r#"
slot-placeholder = Player { $number }

group-goalkeeper = Goalkeeper
group-defence = Defence
group-midfield = Midfield
group-forwards = Forwards
group-pitcher = Pitcher
group-catcher = Catcher
group-first-base = First Base
group-second-base = Second Base
group-third-base = Third Base
group-shortstop = Shortstop
group-left-field = Left Field
group-center-field = Center Field
group-right-field = Right Field
"#;

const JA_JP_FTL: &str = r#"
slot-placeholder = 選手 { $number }

group-goalkeeper = ゴールキーパー
group-defence = ディフェンス
group-midfield = ミッドフィールド
group-forwards = フォワード
group-pitcher = ピッチャー
group-catcher = キャッチャー
group-first-base = ファースト
group-second-base = セカンド
group-third-base = サード
group-shortstop = ショート
group-left-field = レフト
group-center-field = センター
group-right-field = ライト
"#;

const KO_KR_FTL: &str = r#"
slot-placeholder = 선수 { $number }

group-goalkeeper = 골키퍼
group-defence = 수비
group-midfield = 미드필드
group-forwards = 공격
group-pitcher = 투수
group-catcher = 포수
group-first-base = 1루수
group-second-base = 2루수
group-third-base = 3루수
group-shortstop = 유격수
group-left-field = 좌익수
group-center-field = 중견수
group-right-field = 우익수
"#;

/// 로스터 라벨 로컬라이저
pub struct RosterLocalizer {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    current_locale: String,
    fallback_locale: String,
}

impl std::fmt::Debug for RosterLocalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterLocalizer")
            .field("current_locale", &self.current_locale)
            .field("fallback_locale", &self.fallback_locale)
            .finish()
    }
}

impl RosterLocalizer {
    /// Empty localizer; every lookup renders as `[key]` until a locale is loaded
    pub fn empty() -> Self {
        Self {
            bundles: HashMap::new(),
            current_locale: FALLBACK_LOCALE.to_string(),
            fallback_locale: FALLBACK_LOCALE.to_string(),
        }
    }

    /// Localizer with all built-in locales loaded, negotiated against `requested`
    pub fn with_builtin(requested: &str) -> Result<Self> {
        let mut localizer = Self::empty();
        localizer.load_locale("en-US", EN_US_FTL)?;
        localizer.load_locale("ja-JP", JA_JP_FTL)?;
        localizer.load_locale("ko-KR", KO_KR_FTL)?;

        let negotiated = localizer.negotiate_locale(&[requested]);
        localizer.set_locale(&negotiated)?;
        Ok(localizer)
    }

    pub fn load_locale(&mut self, locale: &str, ftl_content: &str) -> Result<()> {
        let resource = FluentResource::try_new(ftl_content.to_string())
            .map_err(|_| LineupError::Localization(format!("Failed to parse FTL for {}", locale)))?;

        let lang_id: LanguageIdentifier = locale
            .parse()
            .map_err(|_| LineupError::Localization(format!("Invalid locale: {}", locale)))?;

        let mut bundle = FluentBundle::new(vec![lang_id]);
        // Labels are rendered verbatim on cards, no bidi isolation marks
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|_| LineupError::Localization(format!("Conflicting messages in {}", locale)))?;

        self.bundles.insert(locale.to_string(), bundle);
        Ok(())
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<()> {
        if !self.bundles.contains_key(locale) {
            return Err(LineupError::Localization(format!("Locale {} not loaded", locale)));
        }
        self.current_locale = locale.to_string();
        Ok(())
    }

    pub fn current_locale(&self) -> &str {
        &self.current_locale
    }

    pub fn negotiate_locale(&self, requested: &[&str]) -> String {
        let available: Vec<LanguageIdentifier> =
            self.bundles.keys().filter_map(|k| k.parse().ok()).collect();

        let requested: Vec<LanguageIdentifier> =
            requested.iter().filter_map(|l| l.parse().ok()).collect();

        let Ok(default) = self.fallback_locale.parse::<LanguageIdentifier>() else {
            return self.fallback_locale.clone();
        };

        let negotiated =
            negotiate_languages(&requested, &available, Some(&default), NegotiationStrategy::Filtering);

        negotiated.first().map(|l| l.to_string()).unwrap_or_else(|| self.fallback_locale.clone())
    }

    pub fn format(&self, key: &str, args: Option<&FluentArgs>) -> String {
        let locales = [self.current_locale.as_str(), self.fallback_locale.as_str()];
        for locale in locales {
            let Some(bundle) = self.bundles.get(locale) else {
                continue;
            };
            let Some(pattern) = bundle.get_message(key).and_then(|m| m.value()) else {
                continue;
            };
            let mut errors = vec![];
            let formatted = bundle.format_pattern(pattern, args, &mut errors);
            if !errors.is_empty() {
                log::warn!("Fluent errors formatting {} in {}: {:?}", key, locale, errors);
            }
            return formatted.into_owned();
        }

        format!("[{}]", key)
    }

    /// Name shown for an empty slot, numbered from 1
    pub fn placeholder_name(&self, index: usize) -> String {
        let mut args = FluentArgs::new();
        args.set("number", FluentValue::from(index as i64 + 1));
        self.format("slot-placeholder", Some(&args))
    }

    pub fn group_name(&self, group: GroupId) -> String {
        self.format(group.message_id(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_names() {
        let en = RosterLocalizer::with_builtin("en-US").unwrap();
        assert_eq!(en.placeholder_name(0), "Player 1");
        assert_eq!(en.placeholder_name(10), "Player 11");

        let ja = RosterLocalizer::with_builtin("ja-JP").unwrap();
        assert_eq!(ja.placeholder_name(2), "選手 3");
    }

    #[test]
    fn test_group_names() {
        let en = RosterLocalizer::with_builtin("en-US").unwrap();
        assert_eq!(en.group_name(GroupId::Forwards), "Forwards");
        assert_eq!(en.group_name(GroupId::Shortstop), "Shortstop");

        let ko = RosterLocalizer::with_builtin("ko-KR").unwrap();
        assert_eq!(ko.group_name(GroupId::Goalkeeper), "골키퍼");
    }

    #[test]
    fn test_negotiation_falls_back() {
        let localizer = RosterLocalizer::with_builtin("fr-FR").unwrap();
        assert_eq!(localizer.current_locale(), "en-US");

        let localizer = RosterLocalizer::with_builtin("ja").unwrap();
        assert_eq!(localizer.current_locale(), "ja-JP");
    }

    #[test]
    fn test_missing_key_renders_bracketed() {
        let localizer = RosterLocalizer::with_builtin("en-US").unwrap();
        assert_eq!(localizer.format("no-such-message", None), "[no-such-message]");

        let empty = RosterLocalizer::empty();
        assert_eq!(empty.placeholder_name(0), "[slot-placeholder]");
    }

    #[test]
    fn test_set_unknown_locale() {
        let mut localizer = RosterLocalizer::with_builtin("en-US").unwrap();
        assert!(localizer.set_locale("de-DE").is_err());
        assert_eq!(localizer.current_locale(), "en-US");
    }
}
