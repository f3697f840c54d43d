//! Keyboard shortcut resolution.

/// A keyboard-triggered editor operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Remove all selected nodes and edges.
    DeleteSelection,
    /// Clear the selection without removing anything.
    Deselect,
    /// Lines → dots → none → lines.
    CycleGrid,
    ToggleTheme,
    ExportPng,
    ExportSvg,
}

/// Resolve a key event to an action, or `None` if unbound. Keys follow the
/// DOM `KeyboardEvent.key` convention.
pub fn resolve(key: &str, ctrl: bool, shift: bool, _alt: bool, meta: bool) -> Option<ShortcutAction> {
    let primary = ctrl || meta;
    match key {
        "Delete" | "Backspace" => Some(ShortcutAction::DeleteSelection),
        "Escape" => Some(ShortcutAction::Deselect),
        "g" | "G" if !primary => Some(ShortcutAction::CycleGrid),
        "d" | "D" if !primary => Some(ShortcutAction::ToggleTheme),
        "e" | "E" if primary && shift => Some(ShortcutAction::ExportSvg),
        "e" | "E" if primary => Some(ShortcutAction::ExportPng),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn delete_keys_resolve() {
        assert_eq!(
            resolve("Delete", false, false, false, false),
            Some(ShortcutAction::DeleteSelection)
        );
        assert_eq!(
            resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::DeleteSelection)
        );
    }

    #[test]
    fn export_prefers_svg_with_shift() {
        assert_eq!(
            resolve("e", true, false, false, false),
            Some(ShortcutAction::ExportPng)
        );
        assert_eq!(
            resolve("E", false, true, false, true),
            Some(ShortcutAction::ExportSvg)
        );
    }

    #[test]
    fn primary_modifier_suppresses_plain_bindings() {
        assert_eq!(resolve("g", true, false, false, false), None);
        assert_eq!(resolve("x", false, false, false, false), None);
    }
}
