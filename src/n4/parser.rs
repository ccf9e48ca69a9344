//! Parser for the controller's groups document.
//!
//! The document describes the switched/dimmed loads. We handle the most
//! relevant features; LEDs and similar extras are not implemented.

use std::sync::Arc;

use log::{info, warn};

use crate::error::KetraError;
use crate::n4::area::Area;
use crate::n4::output::Output;
use crate::n4::registry::{Addressable, CommandClass, DeviceRegistry};
use crate::n4::state::GroupContent;
use crate::protocols::N4Transport;

const LOAD_TYPE: &str = "Ketra_light";

/// The entity graph built from one snapshot.
pub(crate) struct ParsedDb {
    pub area: Area,
    pub outputs: Vec<Arc<Output>>,
    pub registry: DeviceRegistry,
}

/// Build the entity graph from the load records of one snapshot.
///
/// A single area is created per invocation; the groups document carries no
/// area structure, so every load lands in it. Records that fail to decode
/// are skipped, a duplicate load id aborts the parse.
pub(crate) fn parse_db(
    area_name: &str,
    records: &[serde_json::Value],
    transport: &Arc<dyn N4Transport>,
    noop_set_state: bool,
) -> Result<ParsedDb, KetraError> {
    let mut registry = DeviceRegistry::new();
    let mut area = Area::new(area_name, area_name, None);
    let mut outputs = Vec::new();

    for record in records {
        let load: GroupContent = match serde_path_to_error::deserialize(record) {
            Ok(load) => load,
            Err(e) => {
                warn!("skipping malformed load record: {e}");
                continue;
            }
        };

        let output = Arc::new(Output::new(
            load.name.trim(),
            area.uid(),
            LOAD_TYPE,
            (load.state.x_chromaticity, load.state.y_chromaticity),
            load.state.brightness,
            &load.id,
            transport.clone(),
            noop_set_state,
        ));
        registry.register(CommandClass::Load, output.clone() as Arc<dyn Addressable>)?;

        info!("output = {output}");
        area.add_output(output.clone());
        outputs.push(output);
    }

    Ok(ParsedDb {
        area,
        outputs,
        registry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::protocols::testing::RecordingTransport;
    use serde_json::json;

    fn transport() -> Arc<dyn N4Transport> {
        RecordingTransport::new()
    }

    fn assert_close(a: f32, b: f32, tolerance: f32) {
        assert!((a - b).abs() <= tolerance, "{a} != {b}");
    }

    #[test]
    fn one_load_becomes_one_registered_output() {
        let records = vec![json!({
            "Id": "g-1",
            "Name": " Kitchen Pendant ",
            "State": {"Brightness": 0.4, "xChromaticity": 0.33, "yChromaticity": 0.34}
        })];

        let db = parse_db("Kitchen", &records, &transport(), true).unwrap();

        assert_eq!(db.area.outputs().len(), 1);
        let output = &db.area.outputs()[0];
        assert_eq!(output.name(), "Kitchen Pendant");
        assert_eq!(output.level(), 0.4);
        assert_eq!(output.area(), "Kitchen");
        assert!(output.is_dimmable());
        assert!(db.registry.get(CommandClass::Load, "g-1").is_some());
        assert_eq!(db.registry.uid_for_name("Kitchen Pendant"), Some("g-1"));

        // derived views match the xyY transform of the document state
        let expected_rgb = color::xyy_to_rgb(0.33, 0.34, 1.0);
        let rgb = output.rgb();
        for channel in 0..3 {
            assert_close(rgb[channel], expected_rgb[channel], 0.01);
        }
        let (expected_hue, expected_saturation) = color::xy_to_hs(0.33, 0.34);
        let (hue, saturation) = output.hs();
        assert_close(hue, expected_hue, 0.01);
        assert_close(saturation, expected_saturation, 0.001);
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let records = vec![
            json!({"Id": "g-1", "Name": "One"}),
            json!({"Nonsense": true}),
            json!({
                "Id": "g-2",
                "Name": "Two",
                "State": {"Brightness": 1.0, "xChromaticity": 0.3, "yChromaticity": 0.3}
            }),
        ];

        let db = parse_db("Kitchen", &records, &transport(), true).unwrap();
        assert_eq!(db.outputs.len(), 1);
        assert_eq!(db.outputs[0].name(), "Two");
    }

    #[test]
    fn duplicate_load_ids_abort_the_parse() {
        let record = json!({
            "Id": "g-1",
            "Name": "One",
            "State": {"Brightness": 1.0, "xChromaticity": 0.3, "yChromaticity": 0.3}
        });
        let records = vec![record.clone(), record];

        let result = parse_db("Kitchen", &records, &transport(), true);
        assert!(matches!(result, Err(KetraError::IdExists(uid)) if uid == "g-1"));
    }

    #[test]
    fn colliding_load_names_are_renamed() {
        let records = vec![
            json!({
                "Id": "g-1",
                "Name": "Spot",
                "State": {"Brightness": 1.0, "xChromaticity": 0.3, "yChromaticity": 0.3}
            }),
            json!({
                "Id": "g-2",
                "Name": "Spot",
                "State": {"Brightness": 0.5, "xChromaticity": 0.3, "yChromaticity": 0.3}
            }),
        ];

        let db = parse_db("Kitchen", &records, &transport(), true).unwrap();
        assert_eq!(db.outputs[0].name(), "Spot");
        assert_eq!(db.outputs[1].name(), "Spot 2");
    }
}
