//! Wire shapes for the N4's group endpoints.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Response envelope wrapping every N4 API payload.
#[derive(Deserialize, Debug, Clone)]
pub struct Envelope<T> {
    #[serde(rename = "Content")]
    pub content: T,
}

/// One group (load) record as returned by the groups endpoints.
#[derive(Deserialize, Debug, Clone)]
pub struct GroupContent {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "State")]
    pub state: GroupState,
}

/// Visual state of one group.
#[derive(Deserialize, Debug, Clone)]
pub struct GroupState {
    #[serde(rename = "Brightness")]
    pub brightness: f32,
    #[serde(rename = "xChromaticity")]
    pub x_chromaticity: f32,
    #[serde(rename = "yChromaticity")]
    pub y_chromaticity: f32,
    #[serde(rename = "PowerOn", default)]
    pub power_on: Option<bool>,
}

/// The appearance a transition starts from, for writes that want to force
/// the pre-transition look instead of fading from whatever is current.
#[derive(Serialize, Deserialize, Builder, Clone, Debug, Default, PartialEq)]
#[builder(setter(into, strip_option), default)]
#[serde(rename_all = "PascalCase")]
pub struct StartState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_on: Option<bool>,

    #[serde(rename = "xChromaticity", skip_serializing_if = "Option::is_none")]
    pub x_chromaticity: Option<f32>,

    #[serde(rename = "yChromaticity", skip_serializing_if = "Option::is_none")]
    pub y_chromaticity: Option<f32>,
}

/// Body of a `PUT .../Groups/<name>/State` call.
///
/// Any subset of keys may be supplied; omitted keys leave the corresponding
/// device attribute unchanged.
#[derive(Serialize, Deserialize, Builder, Clone, Debug, Default, PartialEq)]
#[builder(setter(into, strip_option), default)]
#[serde(rename_all = "PascalCase")]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_on: Option<bool>,

    #[serde(rename = "xChromaticity", skip_serializing_if = "Option::is_none")]
    pub x_chromaticity: Option<f32>,

    #[serde(rename = "yChromaticity", skip_serializing_if = "Option::is_none")]
    pub y_chromaticity: Option<f32>,

    /// Transition duration in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_time: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_complete: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_state: Option<StartState>,
}

impl StateUpdate {
    /// The payload shape every plain setter sends: power the load on and
    /// fade over one second.
    pub(crate) fn transition() -> Self {
        Self {
            power_on: Some(true),
            transition_time: Some(1000),
            transition_complete: Some(true),
            ..Self::default()
        }
    }
}
