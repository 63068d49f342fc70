//! 详情视图选择状态

use crate::spell::Spell;

/// 当前选中的法术和详情浮层是否可见
///
/// 关闭浮层时保留选中的法术，只隐藏浮层。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    selected: Option<Spell>,
    visible: bool,
}

impl Selection {
    pub fn open(&mut self, spell: Spell) {
        self.selected = Some(spell);
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// 最近一次选中的法术（浮层关闭后仍然保留）
    pub fn selected(&self) -> Option<&Spell> {
        self.selected.as_ref()
    }

    /// 浮层可见时正在展示的法术
    pub fn shown(&self) -> Option<&Spell> {
        self.selected.as_ref().filter(|_| self.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_close() {
        let mut selection = Selection::default();
        assert!(selection.shown().is_none());

        selection.open(Spell::new("fireball", "Fireball", ""));
        assert!(selection.is_visible());
        assert_eq!(selection.shown().map(|s| s.index.as_str()), Some("fireball"));

        selection.close();
        assert!(!selection.is_visible());
        assert!(selection.shown().is_none());
        assert_eq!(selection.selected().map(|s| s.index.as_str()), Some("fireball"));
    }

    #[test]
    fn test_open_replaces_selection() {
        let mut selection = Selection::default();
        selection.open(Spell::new("light", "Light", ""));
        selection.open(Spell::new("shield", "Shield", ""));

        assert_eq!(selection.shown().map(|s| s.index.as_str()), Some("shield"));
    }
}
