use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub id: u64,
    // Missing idx sorts as 0
    #[serde(default)]
    pub idx: u64,
    #[serde(default)]
    pub name: Option<String>,
    // niri reports null for workspaces that lost their output
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_focused: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_focused: bool,
}

/// The document handed to the status bar.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub title: Option<String>,
    pub workspaces: Vec<Workspace>,
    pub workspaces_by_monitor: BTreeMap<String, Vec<Workspace>>,
    pub active_workspace: Option<u64>,
    pub is_overview: bool,
    pub focused_workspace_idx: u64,
    pub focused_output_name: String,
}

impl Snapshot {
    /// Groups `workspaces` by output, keeping the order of the flat list inside each group.
    pub fn group_by_output(workspaces: &[Workspace]) -> BTreeMap<String, Vec<Workspace>> {
        let mut groups: BTreeMap<String, Vec<Workspace>> = BTreeMap::new();
        for workspace in workspaces {
            groups
                .entry(workspace.output.clone())
                .or_default()
                .push(workspace.clone());
        }
        groups
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
