//! The output entity: a switched or dimmed load, e.g. a light fixture.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};

use crate::color;
use crate::error::KetraError;
use crate::n4::coalesce::RequestCoalescer;
use crate::n4::registry::Addressable;
use crate::n4::state::StateUpdate;
use crate::protocols::N4Transport;

/// Cached visual state, canonically brightness plus xy chromaticity.
///
/// RGB and hue/saturation views are derived on demand so they can never
/// drift from the chromaticity. The color temperature is an annotation of
/// the last CCT write and is dropped as soon as the chromaticity is set
/// some other way.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CachedState {
    level: f32,
    xy: (f32, f32),
    cct: Option<f32>,
}

/// A controllable load exposed by the controller.
///
/// Getters read the local cache; setters are no-ops when the requested
/// value equals the cached one, and otherwise dispatch a state write and
/// update the cache optimistically without waiting for a confirmation
/// round-trip.
pub struct Output {
    uid: String,
    name: Mutex<String>,
    area: String,
    load_type: String,
    dimmable: bool,
    noop_set_state: bool,
    transport: Arc<dyn N4Transport>,
    state: Mutex<CachedState>,
    query_waiters: RequestCoalescer,
}

impl Output {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: &str,
        area: &str,
        load_type: &str,
        xy: (f32, f32),
        level: f32,
        uid: &str,
        transport: Arc<dyn N4Transport>,
        noop_set_state: bool,
    ) -> Self {
        Self {
            uid: uid.to_owned(),
            name: Mutex::new(name.to_owned()),
            area: area.to_owned(),
            load_type: load_type.to_owned(),
            // derived once, never recomputed
            dimmable: !load_type.to_lowercase().contains("non-dim"),
            noop_set_state,
            transport,
            state: Mutex::new(CachedState {
                level,
                xy,
                cct: None,
            }),
            query_waiters: RequestCoalescer::new(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn name(&self) -> String {
        self.name.lock().expect("name poisoned").clone()
    }

    /// The id of the area this output belongs to.
    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn load_type(&self) -> &str {
        &self.load_type
    }

    pub fn is_dimmable(&self) -> bool {
        self.dimmable
    }

    /// Last cached output level, no query is performed.
    pub fn level(&self) -> f32 {
        self.cached().level
    }

    /// Last cached xy chromaticity.
    pub fn xy(&self) -> (f32, f32) {
        self.cached().xy
    }

    /// RGB view of the cached chromaticity, channels 0..=255.
    pub fn rgb(&self) -> [f32; 3] {
        let (x, y) = self.xy();
        color::xyy_to_rgb(x, y, 1.0)
    }

    /// Hue (degrees) / saturation view of the cached chromaticity.
    pub fn hs(&self) -> (f32, f32) {
        let (x, y) = self.xy();
        color::xy_to_hs(x, y)
    }

    /// Color temperature of the last CCT write, if the chromaticity has not
    /// been changed through another representation since.
    pub fn cct(&self) -> Option<f32> {
        self.cached().cct
    }

    /// Re-read level and chromaticity from the controller.
    pub async fn refresh(&self) -> Result<(), KetraError> {
        debug!("querying state of {}", self.name());
        let content = self.transport.get_group(&self.name()).await?;
        let mut state = self.state.lock().expect("state poisoned");
        let xy = (content.state.x_chromaticity, content.state.y_chromaticity);
        if state.xy != xy {
            state.cct = None;
        }
        state.xy = xy;
        state.level = content.state.brightness;
        Ok(())
    }

    /// Current output level, refreshed from the controller when possible.
    ///
    /// Concurrent callers share one refresh. The wait is bounded by
    /// `timeout`; on timeout or refresh failure the cached value is
    /// returned as-is, so the result may be stale but never an error.
    pub async fn query_level(&self, timeout: Duration) -> f32 {
        match self.query_waiters.request(|| self.refresh()).await {
            Ok(ticket) => {
                if !ticket.wait(timeout).await {
                    debug!("level query for {} timed out, using cached value", self.name());
                }
            }
            Err(e) => warn!("level refresh for {} failed: {e}", self.name()),
        }
        self.level()
    }

    /// Set a new brightness level in [0, 1].
    pub async fn set_level(&self, new_level: f32) -> Result<(), KetraError> {
        if !(0.0..=1.0).contains(&new_level) {
            return Err(KetraError::InvalidArgument(format!(
                "brightness {new_level} is outside [0, 1]"
            )));
        }
        if self.cached().level == new_level {
            return Ok(());
        }

        let update = StateUpdate {
            brightness: Some(new_level),
            ..StateUpdate::transition()
        };
        self.dispatch(&update).await?;
        self.state.lock().expect("state poisoned").level = new_level;
        Ok(())
    }

    /// Set a new color from RGB channels in [0, 255].
    pub async fn set_rgb(&self, new_rgb: [f32; 3]) -> Result<(), KetraError> {
        if self.rgb() == new_rgb {
            return Ok(());
        }

        let (x, y, _) = color::rgb_to_xyy(new_rgb);
        self.write_chromaticity((x, y), None).await
    }

    /// Set a new color from a hue (degrees) / saturation pair.
    pub async fn set_hs(&self, new_hs: (f32, f32)) -> Result<(), KetraError> {
        if self.hs() == new_hs {
            return Ok(());
        }

        let xy = color::hs_to_xy(new_hs.0, new_hs.1);
        self.write_chromaticity(xy, None).await
    }

    /// Set a new color from xy chromaticity coordinates.
    pub async fn set_xy(&self, new_xy: (f32, f32)) -> Result<(), KetraError> {
        if self.xy() == new_xy {
            return Ok(());
        }

        self.write_chromaticity(new_xy, None).await
    }

    /// Set a new color from a color temperature in kelvin.
    pub async fn set_cct(&self, new_cct: f32) -> Result<(), KetraError> {
        if self.cct() == Some(new_cct) {
            return Ok(());
        }

        let xy = color::kelvin_to_xy(new_cct)?;
        self.write_chromaticity(xy, Some(new_cct)).await
    }

    /// Push a caller-composed state write, e.g. one carrying a start state,
    /// and fold it into the cache. No equality short-circuit is applied.
    pub async fn fade(&self, update: StateUpdate) -> Result<(), KetraError> {
        self.dispatch(&update).await?;

        let mut state = self.state.lock().expect("state poisoned");
        if let Some(brightness) = update.brightness {
            state.level = brightness;
        }
        if let (Some(x), Some(y)) = (update.x_chromaticity, update.y_chromaticity) {
            state.xy = (x, y);
            state.cct = None;
        }
        Ok(())
    }

    async fn write_chromaticity(
        &self,
        xy: (f32, f32),
        cct: Option<f32>,
    ) -> Result<(), KetraError> {
        let update = StateUpdate {
            x_chromaticity: Some(xy.0),
            y_chromaticity: Some(xy.1),
            ..StateUpdate::transition()
        };
        self.dispatch(&update).await?;

        let mut state = self.state.lock().expect("state poisoned");
        state.xy = xy;
        state.cct = cct;
        Ok(())
    }

    async fn dispatch(&self, update: &StateUpdate) -> Result<(), KetraError> {
        info!(
            "Sending {} state {}",
            self.name(),
            serde_json::to_string(update)?
        );
        if self.noop_set_state {
            warn!("noop_set_state is on, not sending the request");
            return Ok(());
        }
        self.transport.put_group_state(&self.name(), update).await
    }

    fn cached(&self) -> CachedState {
        *self.state.lock().expect("state poisoned")
    }
}

impl Addressable for Output {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn name(&self) -> String {
        self.name()
    }

    fn set_name(&self, name: String) {
        *self.name.lock().expect("name poisoned") = name;
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Output name: \"{}\" area: {} load: \"{}\" id: {} {}",
            self.name(),
            self.area,
            self.load_type,
            self.uid,
            if self.dimmable { "(dim)" } else { "" }
        )
    }
}
