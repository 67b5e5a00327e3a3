//! JSON report structures for the tool contract
//!
//! Every subcommand prints exactly one JSON object to stdout:
//! `{"success": true, ...}` with component-specific fields on success,
//! `{"success": false, "error": "..."}` plus a non-zero exit on failure.

use crate::stages::{
    CompositeStats, DilateStats, EditStats, HardenStats, MirrorStats, ShapeStats, ThresholdStats,
};
use crate::types::ContentBox;
use serde::Serialize;
use std::path::PathBuf;

/// Wrapper adding the uniform `success` flag to a report body
#[derive(Debug, Serialize)]
pub(crate) struct Report<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Report<T> {
    pub(crate) fn ok(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Failure contract: `success: false` plus a descriptive error
#[derive(Debug, Serialize)]
pub(crate) struct FailureReport {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ThresholdReport {
    pub dimensions: (u32, u32),
    pub mode: String,
    pub aggressiveness: u8,
    #[serde(flatten)]
    pub stats: ThresholdStats,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShapeReport {
    pub dimensions: (u32, u32),
    #[serde(flatten)]
    pub stats: ShapeStats,
}

#[derive(Debug, Serialize)]
pub(crate) struct MirrorReport {
    pub dimensions: (u32, u32),
    pub center: u32,
    pub source: String,
    #[serde(flatten)]
    pub stats: MirrorStats,
}

#[derive(Debug, Serialize)]
pub(crate) struct HardenReport {
    pub dimensions: (u32, u32),
    pub mode: String,
    pub bg_color: [f32; 3],
    #[serde(flatten)]
    pub stats: HardenStats,
}

#[derive(Debug, Serialize)]
pub(crate) struct EditReport {
    pub dimensions: (u32, u32),
    pub operation: &'static str,
    #[serde(flatten)]
    pub stats: EditStats,
}

#[derive(Debug, Serialize)]
pub(crate) struct DilateReport {
    pub dimensions: (u32, u32),
    #[serde(flatten)]
    pub stats: DilateStats,
}

/// Handoff payload for the external upload/import collaborator
#[derive(Debug, Serialize)]
pub(crate) struct DeliveryManifest {
    pub path: PathBuf,
    pub sku: Option<String>,
    pub angle: Option<String>,
    pub thumbnail: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompositeReport {
    #[serde(flatten)]
    pub stats: CompositeStats,
    pub output: PathBuf,
    pub manifest: DeliveryManifest,
}

#[derive(Debug, Serialize)]
pub(crate) struct InspectReport {
    pub dimensions: (u32, u32),
    pub bg_color: Option<[f32; 3]>,
    pub bg_luminosity: Option<f32>,
    pub content_box: Option<ContentBox>,
    pub opaque_pixels: u64,
    pub partial_pixels: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewReport {
    pub dimensions: (u32, u32),
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_report_flattens_stats() {
        let report = Report::ok(DilateReport {
            dimensions: (10, 20),
            stats: DilateStats {
                radius: 3,
                pixels_grown: 42,
            },
        });
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["radius"], 3);
        assert_eq!(value["pixels_grown"], 42);
        assert_eq!(value["dimensions"][0], 10);
    }

    #[test]
    fn test_failure_report_shape() {
        let failure = FailureReport {
            success: false,
            error: "mask is 10x10 but original is 12x10".to_string(),
        };
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&failure).unwrap()).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().contains("10x10"));
    }

    #[test]
    fn test_manifest_fields() {
        let report = Report::ok(CompositeReport {
            stats: CompositeStats {
                content_box: ContentBox {
                    x: 1,
                    y: 2,
                    width: 3,
                    height: 4,
                },
                scale: 2.0,
                dimensions: (100, 100),
            },
            output: PathBuf::from("final.png"),
            manifest: DeliveryManifest {
                path: PathBuf::from("final.png"),
                sku: Some("SKU-1".to_string()),
                angle: Some("front".to_string()),
                thumbnail: false,
            },
        });
        let value: serde_json::Value =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["manifest"]["sku"], "SKU-1");
        assert_eq!(value["scale"], 2.0);
    }
}
