use crate::model::{Panel, PanelId};

/// Which panel the detail view points at.
///
/// Identity is the panel `id`. A selection holds the copy of the panel from the most recent
/// snapshot so the detail view shows current field values.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Unselected,
    Selected(Panel),
    /// The selected id vanished from the latest snapshot and has not been re-resolved yet.
    Stale(PanelId),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Unselected
    }
}

impl Selection {
    pub fn id(&self) -> Option<PanelId> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(panel) => Some(panel.id),
            Selection::Stale(id) => Some(*id),
        }
    }

    pub fn panel(&self) -> Option<&Panel> {
        match self {
            Selection::Selected(panel) => Some(panel),
            Selection::Unselected | Selection::Stale(_) => None,
        }
    }

    fn first_of(snapshot: &[Panel]) -> Self {
        snapshot
            .first()
            .cloned()
            .map_or(Selection::Unselected, Selection::Selected)
    }

    /// Resolve the selection against a fresh snapshot.
    pub fn reconcile(self, snapshot: &[Panel]) -> Self {
        match self {
            Selection::Unselected => Selection::first_of(snapshot),
            Selection::Selected(panel) => match snapshot.iter().find(|p| p.id == panel.id) {
                Some(fresh) => Selection::Selected(fresh.clone()),
                None => Selection::Stale(panel.id).reconcile(snapshot),
            },
            Selection::Stale(id) => {
                log::info!("selected panel {} is gone, falling back to the first panel", id);
                Selection::first_of(snapshot)
            }
        }
    }

    /// Explicitly select panel `id` from `snapshot`. `None` when the id is not in the snapshot.
    pub fn choose(snapshot: &[Panel], id: PanelId) -> Option<Self> {
        snapshot
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(Selection::Selected)
    }
}

#[cfg(test)]
mod test {
    use super::Selection;
    use crate::model::PanelStatus;
    use crate::stats::test::panel;

    #[test]
    fn first_snapshot_selects_first_panel() {
        let snapshot = vec![
            panel(4, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0),
            panel(2, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0),
        ];

        assert_eq!(Some(4), Selection::Unselected.reconcile(&snapshot).id());
    }

    #[test]
    fn empty_snapshot_keeps_unselected() {
        assert_eq!(Selection::Unselected, Selection::Unselected.reconcile(&[]));
    }

    #[test]
    fn selection_follows_id_across_reorder() {
        let s1 = vec![
            panel(1, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0),
            panel(2, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0),
        ];
        let selected = Selection::choose(&s1, 2).unwrap();

        let s2 = vec![
            panel(2, PanelStatus::Faulty, 12.0, 1.0, 36.0, 6.0),
            panel(1, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0),
        ];
        let reconciled = selected.reconcile(&s2);

        assert_eq!(Some(&s2[0]), reconciled.panel());
        assert_eq!(PanelStatus::Faulty, reconciled.panel().unwrap().status);
    }

    #[test]
    fn vanished_selection_falls_back_to_first() {
        let s1 = vec![panel(5, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0)];
        let selected = Selection::choose(&s1, 5).unwrap();

        let s2 = vec![
            panel(8, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0),
            panel(9, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0),
        ];

        assert_eq!(Some(8), selected.reconcile(&s2).id());
    }

    #[test]
    fn vanished_selection_on_empty_snapshot() {
        let s1 = vec![panel(5, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0)];
        let selected = Selection::choose(&s1, 5).unwrap();

        assert_eq!(Selection::Unselected, selected.reconcile(&[]));
    }

    #[test]
    fn stale_resolves_immediately() {
        let snapshot = vec![panel(3, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0)];
        let resolved = Selection::Stale(7).reconcile(&snapshot);

        assert_eq!(Some(3), resolved.id());
        assert!(resolved.panel().is_some());
    }

    #[test]
    fn choose_unknown_panel() {
        let snapshot = vec![panel(1, PanelStatus::Active, 30.0, 5.0, 36.0, 6.0)];

        assert!(Selection::choose(&snapshot, 2).is_none());
        assert!(Selection::choose(&[], 1).is_none());
    }
}
