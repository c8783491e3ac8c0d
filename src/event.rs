use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::trace;

use crate::{
    error::{DecodeError, EventTypeParseError},
    objects::{Window, Workspace},
};

/// Event tags of `niri msg --json event-stream` that we fold into the snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    WorkspacesChanged,
    WorkspaceActivated,
    WindowsChanged,
    WindowOpenedOrChanged,
    WindowFocusChanged,
    OverviewOpenedOrClosed,
}

impl FromStr for EventType {
    type Err = EventTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use EventType::*;
        Ok(match s {
            "WorkspacesChanged" => WorkspacesChanged,
            "WorkspaceActivated" => WorkspaceActivated,
            "WindowsChanged" => WindowsChanged,
            "WindowOpenedOrChanged" => WindowOpenedOrChanged,
            "WindowFocusChanged" => WindowFocusChanged,
            "OverviewOpenedOrClosed" => OverviewOpenedOrClosed,
            _ => return Err(EventTypeParseError::Unknown(s.to_string())),
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Event {
    WorkspacesChanged { workspaces: Vec<Workspace> },
    WorkspaceActivated { id: u64 },
    WindowsChanged { windows: Vec<Window> },
    WindowOpenedOrChanged { window: Window },
    WindowFocusChanged {
        // null means no window has focus, but the key must be present
        #[serde(deserialize_with = "required_nullable")]
        id: Option<u64>,
    },
    OverviewOpenedOrClosed { is_open: bool },
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::WorkspacesChanged { .. } => EventType::WorkspacesChanged,
            Self::WorkspaceActivated { .. } => EventType::WorkspaceActivated,
            Self::WindowsChanged { .. } => EventType::WindowsChanged,
            Self::WindowOpenedOrChanged { .. } => EventType::WindowOpenedOrChanged,
            Self::WindowFocusChanged { .. } => EventType::WindowFocusChanged,
            Self::OverviewOpenedOrClosed { .. } => EventType::OverviewOpenedOrClosed,
        }
    }

    /// Decodes one line of the event stream.
    ///
    /// Returns `Ok(None)` for well-formed events with a tag we don't model, so that
    /// newer compositor versions don't flood the log.
    pub fn decode(line: &str) -> Result<Option<Self>, DecodeError> {
        let value: Value = serde_json::from_str(line).map_err(|source| DecodeError::Json {
            line: line.to_owned(),
            source,
        })?;

        let event_type = {
            let Value::Object(map) = &value else {
                return Err(DecodeError::Shape(line.to_owned()));
            };
            let mut tags = map.keys();
            let (Some(tag), None) = (tags.next(), tags.next()) else {
                return Err(DecodeError::Shape(line.to_owned()));
            };
            match tag.parse::<EventType>() {
                Ok(event_type) => event_type,
                Err(e) => {
                    trace!("Ignoring event: {e}");
                    return Ok(None);
                }
            }
        };

        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| DecodeError::Payload {
                event_type,
                line: line.to_owned(),
                source,
            })
    }
}

fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}
