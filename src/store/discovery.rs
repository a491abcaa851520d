use std::fmt;

/// Device classes the driver may be enumerated under, in probe order.
pub const DEVICE_CLASSES: [&str; 2] = ["SENSOR", "UNKNOWN"];

/// Instance ids probed under each device class, in probe order.
pub const INSTANCE_IDS: [&str; 4] = ["0000", "0001", "0002", "0003"];

const DEVICE_PARAMETERS: &str = "Device Parameters/FakeGPS";

/// One location the driver's parameter entry may live at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    pub device_class: String,
    pub instance_id: String,
}

impl CandidatePath {
    pub fn new(device_class: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            device_class: device_class.into(),
            instance_id: instance_id.into(),
        }
    }

    /// The full store key for this candidate.
    pub fn key(&self) -> String {
        format!(
            "ROOT/{}/{}/{}",
            self.device_class, self.instance_id, DEVICE_PARAMETERS
        )
    }
}

impl fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

pub fn default_device_classes() -> Vec<String> {
    DEVICE_CLASSES.iter().map(|s| s.to_string()).collect()
}

pub fn default_instance_ids() -> Vec<String> {
    INSTANCE_IDS.iter().map(|s| s.to_string()).collect()
}

/// Enumerate candidates in probe order: device classes outer, instance ids
/// inner. Callers rely on this order being stable.
pub fn candidates<'a>(
    device_classes: &'a [String],
    instance_ids: &'a [String],
) -> impl Iterator<Item = CandidatePath> + 'a {
    device_classes.iter().flat_map(move |device_class| {
        instance_ids
            .iter()
            .map(move |instance_id| CandidatePath::new(device_class.clone(), instance_id.clone()))
    })
}
