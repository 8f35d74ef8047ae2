// ── Well-known annotation keys ──
//
// The core stores and merges these like any other key. Only `driver` is
// interpreted here (it selects the capability driver); the rest are
// advisory and read by higher layers.

use super::annotations::Annotations;

/// Namespace for the reserved annotation keys.
pub struct AnnotationKeys;

impl AnnotationKeys {
    /// Friendly entity name.
    pub const NAME: &'static str = "name";
    /// Entity type hint for presentation.
    pub const UI_TYPE: &'static str = "uiType";
    /// Location type: `geo` or `grid`.
    pub const LOC_TYPE: &'static str = "locType";
    pub const LATITUDE: &'static str = "latitude";
    pub const LONGITUDE: &'static str = "longitude";
    pub const GRID_X: &'static str = "gridX";
    pub const GRID_Y: &'static str = "gridY";
    pub const RACK_ADDRESS: &'static str = "rackAddress";
    pub const OWNER: &'static str = "owner";
    pub const CHANNEL_ID: &'static str = "channelId";
    pub const MANAGEMENT_ADDRESS: &'static str = "managementAddress";
    pub const PROTOCOL: &'static str = "protocol";
    pub const LAYER: &'static str = "layer";
    /// Link or device survives provider loss.
    pub const DURABLE: &'static str = "durable";
    /// Link latency, in nanoseconds.
    pub const LATENCY: &'static str = "latency";
    /// Link bandwidth, in Mbps.
    pub const BANDWIDTH: &'static str = "bandwidth";
    pub const METERED_USAGE: &'static str = "meteredUsage";
    /// Name of the driver bound to the entity.
    pub const DRIVER: &'static str = "driver";
    pub const PORT_NAME: &'static str = "portName";
    pub const PORT_MAC: &'static str = "portMac";
    pub const ROUTER_ID: &'static str = "routerId";
    pub const STATIC_LINK: &'static str = "staticLink";
    pub const STATIC_PORT: &'static str = "staticPort";
    pub const TYPE: &'static str = "type";

    /// Numeric value of `key`, or `-1.0` if missing or not a number.
    pub fn value_f64(annotations: &Annotations, key: &str) -> f64 {
        annotations
            .value(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_lookup_defaults_to_negative_one() {
        let annotations: Annotations = [(AnnotationKeys::LATENCY, "12.5"), ("bad", "x")]
            .into_iter()
            .collect();
        assert!((AnnotationKeys::value_f64(&annotations, AnnotationKeys::LATENCY) - 12.5).abs() < f64::EPSILON);
        assert!((AnnotationKeys::value_f64(&annotations, "bad") + 1.0).abs() < f64::EPSILON);
        assert!((AnnotationKeys::value_f64(&annotations, "missing") + 1.0).abs() < f64::EPSILON);
    }
}
