use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{
    event::Event,
    objects::{Snapshot, Window, Workspace},
};

/// Title reported when focus moves to a window we have never seen.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Everything we know about the compositor, built up one event at a time.
#[derive(Debug, Default)]
pub struct State {
    snapshot: Snapshot,
    // Never shrinks, there is no close event to act on
    window_titles: HashMap<u64, Option<String>>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::WorkspacesChanged { workspaces } => self.replace_workspaces(workspaces),
            Event::WorkspaceActivated { id } => self.activate_workspace(id),
            Event::WindowsChanged { windows } => {
                for window in windows {
                    self.observe_window(window);
                }
            }
            Event::WindowOpenedOrChanged { window } => self.observe_window(window),
            Event::WindowFocusChanged { id } => {
                self.snapshot.title = id.and_then(|id| {
                    self.window_titles
                        .get(&id)
                        .cloned()
                        .unwrap_or_else(|| Some(UNKNOWN_TITLE.to_owned()))
                });
            }
            Event::OverviewOpenedOrClosed { is_open } => self.snapshot.is_overview = is_open,
        }
    }

    /// Replaces the workspace set wholesale.
    ///
    /// If no workspace claims focus the previous focus fields are kept: niri sends
    /// enumerations without a focused workspace while switching.
    fn replace_workspaces(&mut self, mut workspaces: Vec<Workspace>) {
        // Stable, so equal idx keep the compositor's order
        workspaces.sort_by_key(|ws| ws.idx);

        let mut focused = None;
        for ws in workspaces.iter_mut().filter(|ws| ws.is_focused) {
            if focused.is_none() {
                focused = Some(ws.clone());
            } else {
                debug!(id = ws.id, "Dropping second focused workspace");
                ws.is_focused = false;
            }
        }

        self.snapshot.workspaces = workspaces;
        if let Some(ws) = focused {
            self.set_focus(&ws);
        }
        self.regroup();
    }

    fn activate_workspace(&mut self, id: u64) {
        let mut focused = None;
        for ws in &mut self.snapshot.workspaces {
            ws.is_focused = ws.id == id;
            if ws.is_focused {
                focused = Some(ws.clone());
            }
        }

        match focused {
            Some(ws) => self.set_focus(&ws),
            None => debug!(id, "Activated workspace is not in the current set"),
        }
        self.regroup();
    }

    fn observe_window(&mut self, window: Window) {
        trace!(id = window.id, title = ?window.title, "Observed window");
        if window.is_focused {
            self.snapshot.title = window.title.clone();
        }
        self.window_titles.insert(window.id, window.title);
    }

    fn set_focus(&mut self, ws: &Workspace) {
        self.snapshot.active_workspace = Some(ws.id);
        self.snapshot.focused_workspace_idx = ws.idx;
        self.snapshot.focused_output_name = ws.output.clone();
    }

    fn regroup(&mut self) {
        self.snapshot.workspaces_by_monitor = Snapshot::group_by_output(&self.snapshot.workspaces);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(id: u64, idx: u64, output: &str, is_focused: bool) -> Workspace {
        Workspace {
            id,
            idx,
            name: None,
            output: output.to_owned(),
            is_active: is_focused,
            is_focused,
        }
    }

    fn window(id: u64, title: Option<&str>, is_focused: bool) -> Window {
        Window {
            id,
            title: title.map(str::to_owned),
            is_focused,
        }
    }

    fn focused_ids(state: &State) -> Vec<u64> {
        state
            .snapshot()
            .workspaces
            .iter()
            .filter(|ws| ws.is_focused)
            .map(|ws| ws.id)
            .collect()
    }

    fn assert_grouping_matches(snapshot: &Snapshot) {
        assert_eq!(
            snapshot.workspaces_by_monitor,
            Snapshot::group_by_output(&snapshot.workspaces)
        );
        let grouped: usize = snapshot.workspaces_by_monitor.values().map(Vec::len).sum();
        assert_eq!(grouped, snapshot.workspaces.len());
    }

    /// Three workspaces on two outputs, workspace 2 focused.
    fn two_monitor_state() -> State {
        let mut state = State::new();
        state.apply(Event::WorkspacesChanged {
            workspaces: vec![
                ws(3, 2, "DP-1", false),
                ws(1, 1, "DP-1", false),
                ws(2, 1, "HDMI-A-1", true),
            ],
        });
        state
    }

    #[test]
    fn workspaces_changed_sorts_stably_and_groups() {
        let state = two_monitor_state();
        let snapshot = state.snapshot();

        let ids: Vec<u64> = snapshot.workspaces.iter().map(|w| w.id).collect();
        // 1 and 2 share idx 1 and keep input order
        assert_eq!(ids, vec![1, 2, 3]);
        assert_grouping_matches(snapshot);

        assert_eq!(snapshot.active_workspace, Some(2));
        assert_eq!(snapshot.focused_workspace_idx, 1);
        assert_eq!(snapshot.focused_output_name, "HDMI-A-1");
    }

    #[test]
    fn workspaces_changed_without_focus_keeps_last_focus() {
        let mut state = two_monitor_state();
        state.apply(Event::WorkspacesChanged {
            workspaces: vec![ws(5, 0, "DP-1", false), ws(6, 1, "DP-1", false)],
        });

        let snapshot = state.snapshot();
        assert_eq!(snapshot.workspaces.len(), 2);
        assert_eq!(snapshot.active_workspace, Some(2));
        assert_eq!(snapshot.focused_workspace_idx, 1);
        assert_eq!(snapshot.focused_output_name, "HDMI-A-1");
        assert_grouping_matches(snapshot);
    }

    #[test]
    fn workspaces_changed_keeps_only_first_focused() {
        let mut state = State::new();
        state.apply(Event::WorkspacesChanged {
            workspaces: vec![ws(1, 2, "DP-1", true), ws(2, 1, "DP-1", true)],
        });

        assert_eq!(focused_ids(&state), vec![2]);
        assert_eq!(state.snapshot().active_workspace, Some(2));
        assert_grouping_matches(state.snapshot());
    }

    #[test]
    fn workspace_activated_moves_focus() {
        let mut state = two_monitor_state();
        state.apply(Event::WorkspaceActivated { id: 3 });

        let snapshot = state.snapshot();
        assert_eq!(focused_ids(&state), vec![3]);
        assert_eq!(snapshot.active_workspace, Some(3));
        assert_eq!(snapshot.focused_workspace_idx, 2);
        assert_eq!(snapshot.focused_output_name, "DP-1");
        assert!(snapshot.workspaces_by_monitor["DP-1"][1].is_focused);
        assert!(!snapshot.workspaces_by_monitor["HDMI-A-1"][0].is_focused);
        assert_grouping_matches(snapshot);
    }

    #[test]
    fn workspace_activated_with_unknown_id_unfocuses_everything() {
        let mut state = two_monitor_state();
        state.apply(Event::WorkspaceActivated { id: 99 });

        let snapshot = state.snapshot();
        assert!(focused_ids(&state).is_empty());
        assert_eq!(snapshot.active_workspace, Some(2));
        assert_eq!(snapshot.focused_workspace_idx, 1);
        assert_eq!(snapshot.focused_output_name, "HDMI-A-1");
        assert_grouping_matches(snapshot);
    }

    #[test]
    fn at_most_one_focused_workspace_across_sequences() {
        let mut state = State::new();
        let events = vec![
            Event::WorkspacesChanged {
                workspaces: vec![ws(1, 0, "A", true), ws(2, 1, "B", true)],
            },
            Event::WorkspaceActivated { id: 2 },
            Event::WorkspacesChanged {
                workspaces: vec![ws(1, 0, "A", false), ws(2, 1, "B", true), ws(3, 2, "A", true)],
            },
            Event::WorkspaceActivated { id: 7 },
            Event::WorkspaceActivated { id: 1 },
        ];
        for event in events {
            state.apply(event);
            assert!(focused_ids(&state).len() <= 1);
            assert_grouping_matches(state.snapshot());
        }
        assert_eq!(focused_ids(&state), vec![1]);
    }

    #[test]
    fn windows_changed_fills_directory_and_focused_title() {
        let mut state = State::new();
        state.apply(Event::WindowsChanged {
            windows: vec![window(1, Some("a"), false), window(2, Some("b"), true)],
        });
        assert_eq!(state.snapshot().title.as_deref(), Some("b"));

        state.apply(Event::WindowFocusChanged { id: Some(1) });
        assert_eq!(state.snapshot().title.as_deref(), Some("a"));
    }

    #[test]
    fn windows_changed_without_focus_keeps_title() {
        let mut state = State::new();
        state.apply(Event::WindowOpenedOrChanged {
            window: window(1, Some("editor"), true),
        });
        state.apply(Event::WindowsChanged {
            windows: vec![window(2, Some("other"), false)],
        });
        assert_eq!(state.snapshot().title.as_deref(), Some("editor"));
    }

    #[test]
    fn unfocused_window_change_updates_directory_only() {
        let mut state = State::new();
        state.apply(Event::WindowOpenedOrChanged {
            window: window(1, Some("focused"), true),
        });
        state.apply(Event::WindowOpenedOrChanged {
            window: window(2, Some("background"), false),
        });
        assert_eq!(state.snapshot().title.as_deref(), Some("focused"));

        state.apply(Event::WindowOpenedOrChanged {
            window: window(2, Some("renamed"), false),
        });
        state.apply(Event::WindowFocusChanged { id: Some(2) });
        assert_eq!(state.snapshot().title.as_deref(), Some("renamed"));
    }

    #[test]
    fn focus_change_to_null_clears_title() {
        let mut state = State::new();
        state.apply(Event::WindowOpenedOrChanged {
            window: window(1, Some("term"), true),
        });
        state.apply(Event::WindowFocusChanged { id: None });
        assert_eq!(state.snapshot().title, None);
    }

    #[test]
    fn focus_change_to_unseen_window_is_unknown() {
        let mut state = State::new();
        state.apply(Event::WindowFocusChanged { id: Some(42) });
        assert_eq!(state.snapshot().title.as_deref(), Some(UNKNOWN_TITLE));
    }

    #[test]
    fn focus_change_to_untitled_window_is_null() {
        let mut state = State::new();
        state.apply(Event::WindowOpenedOrChanged {
            window: window(5, None, false),
        });
        state.apply(Event::WindowFocusChanged { id: Some(5) });
        assert_eq!(state.snapshot().title, None);
    }

    #[test]
    fn overview_toggle_on_fresh_state() {
        let mut state = State::new();
        state.apply(Event::OverviewOpenedOrClosed { is_open: true });

        let expected = Snapshot {
            is_overview: true,
            ..Snapshot::default()
        };
        assert_eq!(state.snapshot(), &expected);

        state.apply(Event::OverviewOpenedOrClosed { is_open: false });
        assert!(!state.snapshot().is_overview);
    }
}
