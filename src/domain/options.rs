//! Options module.
//!
//! This module contains the typed setters of the webapp options an
//! administrator usually changes, plus the free-form inject and
//! remove operations.

use log::{debug, info, warn};
use serde_json::{json, Value};
use std::{fmt, str::FromStr};

use crate::settings::{
    coerce, parse_int, parse_int_in_range, Assignment, Error, Result, SettingsPath, SettingsTree,
    ValueKind, ROOT_KEY,
};

pub const LANGUAGE_PATH: &str = "settings.zarafa.v1.main.language";
pub const THEME_PATH: &str = "settings.zarafa.v1.main.active_theme";
pub const ICON_SET_PATH: &str = "settings.zarafa.v1.main.active_iconset";
pub const POLLING_INTERVAL_PATH: &str = "settings.zarafa.v1.main.reminder.polling_interval";
pub const HTML_EDITOR_PATH: &str = "settings.zarafa.v1.contexts.mail.html_editor";
pub const SAFE_SENDERS_PATH: &str = "settings.zarafa.v1.contexts.mail.safe_senders_list";
pub const FREE_BUSY_RANGE_PATH: &str = "settings.zarafa.v1.contexts.calendar.free_busy_range";
pub const CALENDAR_RESOLUTION_PATH: &str =
    "settings.zarafa.v1.contexts.calendar.default_zoom_level";
pub const STATE_PATH: &str = "settings.zarafa.v1.state";

/// Language value asking for the language of the user directory.
pub const USER_DEFINED_LANGUAGE: &str = "userdefined";

/// Maximum number of months free/busy information can be published
/// for.
pub const MAX_FREE_BUSY_RANGE: i64 = 36;
pub const MIN_CALENDAR_RESOLUTION: i64 = 5;
pub const MAX_CALENDAR_RESOLUTION: i64 = 60;

/// Represents the icon set of the webapp.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IconSet {
    Breeze,
    Classic,
}

impl IconSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breeze => "Breeze",
            Self::Classic => "Classic",
        }
    }
}

impl FromStr for IconSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Breeze" => Ok(Self::Breeze),
            "Classic" => Ok(Self::Classic),
            icon_set => Err(Error::InvalidChoice(icon_set.to_owned(), "Breeze, Classic".into())),
        }
    }
}

impl fmt::Display for IconSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the HTML editor used to compose messages.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HtmlEditor {
    MinimalTiny,
    FullTiny,
}

impl HtmlEditor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinimalTiny => "htmleditor-minimaltiny",
            Self::FullTiny => "full_tinymce",
        }
    }
}

impl FromStr for HtmlEditor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "htmleditor-minimaltiny" => Ok(Self::MinimalTiny),
            "full_tinymce" => Ok(Self::FullTiny),
            editor => Err(Error::InvalidChoice(
                editor.to_owned(),
                "htmleditor-minimaltiny, full_tinymce".into(),
            )),
        }
    }
}

impl fmt::Display for HtmlEditor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn path(path: &'static str) -> SettingsPath {
    SettingsPath::from_static(path)
}

/// Resolves the language to store. `userdefined` stands for the
/// language of the user directory, or the fallback one when the
/// directory has none.
pub fn resolve_language(requested: &str, directory: Option<&str>, fallback: &str) -> String {
    if requested != USER_DEFINED_LANGUAGE {
        return requested.to_owned();
    }

    match directory {
        Some(language) if !language.trim().is_empty() => language.to_owned(),
        _ => {
            warn!("user language is not defined, using {} as fallback", fallback);
            fallback.to_owned()
        }
    }
}

pub fn set_language(tree: &mut SettingsTree, language: &str) {
    info!("setting locale to {}", language);
    tree.set(&path(LANGUAGE_PATH), language);
}

pub fn set_theme(tree: &mut SettingsTree, theme: &str) {
    info!("changing theme to {}", theme);
    tree.set(&path(THEME_PATH), theme.trim());
}

pub fn set_icon_set(tree: &mut SettingsTree, icon_set: IconSet) {
    info!("changing icon set to {}", icon_set);
    tree.set(&path(ICON_SET_PATH), icon_set.as_str());
}

pub fn set_html_editor(tree: &mut SettingsTree, editor: HtmlEditor) {
    info!("changing editor to {}", editor);
    tree.set(&path(HTML_EDITOR_PATH), editor.as_str());
}

/// Sets the number of months free/busy information is published for
/// and returns the stored value. Values above the maximum are capped,
/// 0 disables publishing.
pub fn set_free_busy_range(tree: &mut SettingsTree, input: &str) -> Result<i64> {
    let mut months = parse_int(input)?;
    if months < 0 {
        return Err(Error::OutOfRange {
            value: months,
            min: 0,
            max: MAX_FREE_BUSY_RANGE,
        });
    }
    if months > MAX_FREE_BUSY_RANGE {
        warn!(
            "maximum publishing months is {}, using {} instead of {}",
            MAX_FREE_BUSY_RANGE, MAX_FREE_BUSY_RANGE, months
        );
        months = MAX_FREE_BUSY_RANGE;
    }

    if months == 0 {
        info!("disabling free/busy publishing");
    } else {
        info!("publishing free/busy for {} months", months);
    }
    tree.set(&path(FREE_BUSY_RANGE_PATH), months);
    Ok(months)
}

/// Sets the reminder polling interval, in seconds. The webapp reads
/// it as a string.
pub fn set_polling_interval(tree: &mut SettingsTree, input: &str) -> Result<i64> {
    let seconds = parse_int(input)?;
    info!("changing polling interval to {}", seconds);
    tree.set(&path(POLLING_INTERVAL_PATH), seconds.to_string());
    Ok(seconds)
}

/// Sets the calendar resolution (zoom level), in minutes.
pub fn set_calendar_resolution(tree: &mut SettingsTree, input: &str) -> Result<i64> {
    let minutes = parse_int_in_range(input, MIN_CALENDAR_RESOLUTION, MAX_CALENDAR_RESOLUTION)?;
    info!("changing calendar resolution to {}", minutes);
    tree.set(&path(CALENDAR_RESOLUTION_PATH), minutes);
    Ok(minutes)
}

/// Appends the comma-separated senders to the safe senders list and
/// returns the ones that were not there yet.
pub fn add_safe_senders(tree: &mut SettingsTree, input: &str) -> Vec<String> {
    let senders: Vec<String> = match coerce(input, ValueKind::List) {
        Value::Array(senders) => senders
            .into_iter()
            .filter_map(|sender| match sender {
                Value::String(sender) if !sender.trim().is_empty() => {
                    Some(sender.trim().to_owned())
                }
                _ => None,
            })
            .collect(),
        _ => vec![input.trim().to_owned()],
    };

    let path = path(SAFE_SENDERS_PATH);
    let mut list = match tree.get(&path) {
        Some(Value::Array(list)) => list.clone(),
        _ => Vec::new(),
    };

    let mut added = Vec::new();
    for sender in senders {
        if list.iter().any(|known| known.as_str() == Some(&sender)) {
            debug!("{} already in safe senders list", sender);
            continue;
        }
        list.push(Value::String(sender.clone()));
        added.push(sender);
    }

    info!("adding {:?} to safe senders list", added);
    tree.set(&path, list);
    added
}

/// Replaces the state settings by an empty mapping.
pub fn remove_state(tree: &mut SettingsTree) {
    info!("removing state settings");
    tree.set(&path(STATE_PATH), json!({}));
}

/// Checks that the path points strictly below the `settings` root, so
/// that the root itself can neither be replaced nor removed.
fn check_option_path(path: &SettingsPath) -> Result<()> {
    match path.first() {
        Some(root) if root == ROOT_KEY && path.len() > 1 => Ok(()),
        _ => Err(Error::InvalidPath(path.to_string())),
    }
}

/// Parses a `path = value` expression and merges it into the tree.
/// The path must start with `settings` and go below it. Nothing is
/// changed when the expression is invalid.
pub fn inject(tree: &mut SettingsTree, expr: &str, kind: ValueKind) -> Result<Assignment> {
    let assignment = Assignment::parse(expr, kind)?;
    check_option_path(&assignment.path)?;
    info!("injecting {} = {}", assignment.path, assignment.value);
    tree.merge(&assignment.to_overlay());
    Ok(assignment)
}

/// Removes the value at the given dotted path and returns it. The
/// path must start with `settings` and go below it.
pub fn remove_option(tree: &mut SettingsTree, path: &str) -> Result<Option<Value>> {
    let path = SettingsPath::parse(path)?;
    check_option_path(&path)?;
    let removed = tree.delete(&path);
    if removed.is_some() {
        info!("removing option {}", path);
    } else {
        debug!("option {} not found", path);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn get<'a>(tree: &'a SettingsTree, p: &'static str) -> Option<&'a Value> {
        tree.get(&path(p))
    }

    #[test]
    fn free_busy_range_is_capped() {
        let mut tree = SettingsTree::default();
        assert_eq!(36, set_free_busy_range(&mut tree, "50").unwrap());
        assert_eq!(Some(&json!(36)), get(&tree, FREE_BUSY_RANGE_PATH));

        assert_eq!(0, set_free_busy_range(&mut tree, "0").unwrap());
        assert_eq!(Some(&json!(0)), get(&tree, FREE_BUSY_RANGE_PATH));
    }

    #[test]
    fn free_busy_range_rejects_invalid_input() {
        let mut tree = SettingsTree::default();
        assert!(matches!(
            set_free_busy_range(&mut tree, "many"),
            Err(Error::InvalidValue(_, input)) if input == "many"
        ));
        assert!(matches!(
            set_free_busy_range(&mut tree, "-1"),
            Err(Error::OutOfRange { value: -1, .. })
        ));
        assert_eq!(SettingsTree::default(), tree);
    }

    #[test]
    fn calendar_resolution_bounds() {
        let mut tree = SettingsTree::default();
        assert!(set_calendar_resolution(&mut tree, "4").is_err());
        assert!(set_calendar_resolution(&mut tree, "61").is_err());
        assert_eq!(SettingsTree::default(), tree);

        assert_eq!(15, set_calendar_resolution(&mut tree, " 15 ").unwrap());
        assert_eq!(Some(&json!(15)), get(&tree, CALENDAR_RESOLUTION_PATH));
    }

    #[test]
    fn polling_interval_as_string() {
        let mut tree = SettingsTree::default();
        assert!(set_polling_interval(&mut tree, "30s").is_err());
        set_polling_interval(&mut tree, "30").unwrap();
        assert_eq!(Some(&json!("30")), get(&tree, POLLING_INTERVAL_PATH));
    }

    #[test]
    fn choices() {
        let mut tree = SettingsTree::default();
        set_icon_set(&mut tree, "Classic".parse().unwrap());
        set_html_editor(&mut tree, "full_tinymce".parse().unwrap());
        assert_eq!(Some(&json!("Classic")), get(&tree, ICON_SET_PATH));
        assert_eq!(Some(&json!("full_tinymce")), get(&tree, HTML_EDITOR_PATH));

        assert!(matches!(
            "breeze".parse::<IconSet>(),
            Err(Error::InvalidChoice(_, _))
        ));
        assert!("tinymce".parse::<HtmlEditor>().is_err());
    }

    #[test]
    fn language_resolution() {
        assert_eq!("nl_NL", resolve_language("nl_NL", Some("de_DE"), "en_GB"));
        assert_eq!("de_DE", resolve_language("userdefined", Some("de_DE"), "en_GB"));
        assert_eq!("en_GB", resolve_language("userdefined", None, "en_GB"));
        assert_eq!("en_GB", resolve_language("userdefined", Some(""), "en_GB"));

        let mut tree = SettingsTree::default();
        set_language(&mut tree, "nl_NL");
        assert_eq!(Some(&json!("nl_NL")), get(&tree, LANGUAGE_PATH));
    }

    #[test]
    fn safe_senders_are_appended_once() {
        let mut tree = SettingsTree::default();
        assert_eq!(vec!["a.com", "b.com"], add_safe_senders(&mut tree, "a.com, b.com"));
        assert_eq!(vec!["c.com"], add_safe_senders(&mut tree, "b.com,c.com"));
        assert_eq!(
            Some(&json!(["a.com", "b.com", "c.com"])),
            get(&tree, SAFE_SENDERS_PATH)
        );
    }

    #[test]
    fn state_is_emptied() {
        let mut tree = SettingsTree::default();
        tree.set(&path(STATE_PATH), json!({"models": {"a": 1}}));
        remove_state(&mut tree);
        assert_eq!(Some(&json!({})), get(&tree, STATE_PATH));
    }

    #[test]
    fn inject_and_remove() {
        let mut tree = SettingsTree::default();
        inject(&mut tree, "settings.zarafa.v1.main.active_theme = dark", ValueKind::Text).unwrap();
        inject(&mut tree, "settings.zarafa.v1.main.show_welcome = FALSE", ValueKind::Text).unwrap();
        assert_eq!(Some(&json!("dark")), get(&tree, THEME_PATH));
        assert_eq!(
            Some(&json!({"active_theme": "dark", "show_welcome": false})),
            get(&tree, "settings.zarafa.v1.main")
        );
        // untouched branches survive the merge
        assert_eq!(Some(&json!({})), get(&tree, "settings.zarafa.v1.contexts.mail"));

        assert!(inject(&mut tree, "no assignment", ValueKind::Text).is_err());
        assert!(inject(&mut tree, "a..b = c", ValueKind::Text).is_err());

        assert_eq!(Some(json!("dark")), remove_option(&mut tree, THEME_PATH).unwrap());
        assert_eq!(None, remove_option(&mut tree, THEME_PATH).unwrap());
    }

    #[test]
    fn settings_root_cannot_be_replaced_or_removed() {
        let mut tree = SettingsTree::default();
        set_theme(&mut tree, "dark");
        let before = tree.clone();

        for expr in ["settings = oops", "zarafa.v1.main.active_theme = dark", " settings = {}"] {
            assert!(matches!(
                inject(&mut tree, expr, ValueKind::Text),
                Err(Error::InvalidPath(_))
            ));
        }
        for path in ["settings", "other.key"] {
            assert!(matches!(
                remove_option(&mut tree, path),
                Err(Error::InvalidPath(_))
            ));
        }

        assert_eq!(before, tree);
        assert!(tree.has_settings_root());
    }
}
