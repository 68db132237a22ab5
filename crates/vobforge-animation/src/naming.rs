//! Clip naming conventions: `<SKELETON>-<CLIP>.MAN`

use vobforge_core::ident;

/// File name of the successor clip, if the source names one
pub fn next_clip_name(skeleton: &str, next: &str) -> Option<String> {
    let next = next.trim();
    if next.is_empty() {
        return None;
    }
    Some(format!(
        "{}-{}.MAN",
        ident::normalize(skeleton),
        next.to_ascii_uppercase()
    ))
}

/// Split a clip file name into `(skeleton folder, clip name)`.
///
/// The split happens at the first `-`. Names without one are filed under
/// `fallback_skeleton`.
pub fn clip_location(name: &str, fallback_skeleton: &str) -> (String, String) {
    let stem = ident::normalize(name);
    match stem.split_once('-') {
        Some((skeleton, clip)) if !skeleton.is_empty() && !clip.is_empty() => {
            (skeleton.to_string(), clip.to_string())
        }
        _ => (ident::normalize(fallback_skeleton), stem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_clip_name() {
        assert_eq!(
            next_clip_name("humans.mdh", "s_run").as_deref(),
            Some("HUMANS-S_RUN.MAN")
        );
        assert_eq!(next_clip_name("HUMANS", ""), None);
    }

    #[test]
    fn test_clip_location_splits_first_dash() {
        assert_eq!(
            clip_location("Humans-T_Run_2_RunL.man", "HUMANS"),
            ("HUMANS".to_string(), "T_RUN_2_RUNL".to_string())
        );
        assert_eq!(
            clip_location("ORC-T_1H-ATTACK.MAN", "ORC"),
            ("ORC".to_string(), "T_1H-ATTACK".to_string())
        );
        assert_eq!(
            clip_location("S_RUN.MAN", "humans.mdh"),
            ("HUMANS".to_string(), "S_RUN".to_string())
        );
    }
}
