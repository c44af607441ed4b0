//! Device registry and codec factory for patchwire.
//!
//! This crate provides a central list of the supported synthesizers. It
//! lets callers pick a device by id at runtime and identify the device that
//! produced a dump.
//!
//! # Features
//!
//! - **Device Discovery**: List all devices with their static descriptors
//! - **Factory Pattern**: Create boxed codecs by id and connection settings
//! - **Family Filter**: Devices grouped by codec family
//! - **Identification**: Find the device that recognizes a frame
//!
//! # Example
//!
//! ```rust
//! use patchwire_core::{DeviceFamily, DeviceSettings};
//! use patchwire_registry::DeviceRegistry;
//!
//! let registry = DeviceRegistry::new();
//!
//! for device in registry.all_devices() {
//!     println!("{}: {}", device.id, device.name);
//! }
//!
//! let codec = registry.create("tx81z", &DeviceSettings::on_channel(2)).unwrap();
//! assert_eq!(codec.descriptor().name, "Yamaha TX81Z");
//!
//! for device in registry.devices_in_family(DeviceFamily::Yamaha4Op) {
//!     println!("4-op model: {}", device.name);
//! }
//! ```

use patchwire_core::{DeviceDescriptor, DeviceFamily, DeviceSettings, SysexCodec, split_frames};
use patchwire_devices::yamaha4op::performance;
use patchwire_devices::{
    Fb01, PerformanceModel, Venom, VenomArp, VenomGlobal, VenomMulti, Yamaha4Op, Yamaha4OpModel,
    Yamaha4OpPerformance, fb01, venom, yamaha4op,
};

/// Factory function type for creating codecs.
type CodecFactory = fn(&DeviceSettings) -> Box<dyn SysexCodec + Send + Sync>;

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: &'static DeviceDescriptor,
    factory: CodecFactory,
}

/// Registry of all supported devices.
///
/// Built-in devices are registered on construction, one entry per model and
/// dump kind. Models of the 4-op family share a codec type but keep their
/// own descriptor.
pub struct DeviceRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry {
    /// Create a new registry with all built-in devices registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(13),
        };
        registry.register_builtin_devices();
        registry
    }

    fn register_builtin_devices(&mut self) {
        self.register(&venom::DESCRIPTOR, |s| Box::new(Venom::new(*s)));
        self.register(&venom::multi::MULTI, |s| Box::new(VenomMulti::new(*s)));
        self.register(&venom::arp::ARP, |s| Box::new(VenomArp::new(*s)));
        self.register(&venom::global::GLOBAL, |s| Box::new(VenomGlobal::new(*s)));

        self.register(&yamaha4op::DX21, |s| Box::new(Yamaha4Op::new(Yamaha4OpModel::Dx21, *s)));
        self.register(&yamaha4op::DX27, |s| Box::new(Yamaha4Op::new(Yamaha4OpModel::Dx27, *s)));
        self.register(&yamaha4op::TX81Z, |s| {
            Box::new(Yamaha4Op::new(Yamaha4OpModel::Tx81z, *s))
        });
        self.register(&yamaha4op::DX11, |s| Box::new(Yamaha4Op::new(Yamaha4OpModel::Dx11, *s)));
        self.register(&yamaha4op::TQ5, |s| Box::new(Yamaha4Op::new(Yamaha4OpModel::Tq5, *s)));
        self.register(&yamaha4op::V50, |s| Box::new(Yamaha4Op::new(Yamaha4OpModel::V50, *s)));
        self.register(&performance::TX81Z_PERFORMANCE, |s| {
            Box::new(Yamaha4OpPerformance::new(PerformanceModel::Tx81z, *s))
        });
        self.register(&performance::DX11_PERFORMANCE, |s| {
            Box::new(Yamaha4OpPerformance::new(PerformanceModel::Dx11, *s))
        });

        self.register(&fb01::DESCRIPTOR, |s| Box::new(Fb01::new(*s)));
    }

    fn register(&mut self, descriptor: &'static DeviceDescriptor, factory: CodecFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Returns descriptors for all registered devices.
    pub fn all_devices(&self) -> Vec<&'static DeviceDescriptor> {
        self.entries.iter().map(|e| e.descriptor).collect()
    }

    /// Returns descriptors for devices in one family.
    pub fn devices_in_family(&self, family: DeviceFamily) -> Vec<&'static DeviceDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.family == family)
            .map(|e| e.descriptor)
            .collect()
    }

    /// Get a descriptor by device id (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&'static DeviceDescriptor> {
        self.find(id).map(|e| e.descriptor)
    }

    /// Create a codec for `id` talking to a device with `settings`.
    ///
    /// Returns `None` if the device id is not found.
    pub fn create(
        &self,
        id: &str,
        settings: &DeviceSettings,
    ) -> Option<Box<dyn SysexCodec + Send + Sync>> {
        self.find(id).map(|e| (e.factory)(settings))
    }

    /// Descriptor of the first device whose codec recognizes a frame in
    /// `data`.
    ///
    /// Frames shared by a whole family resolve to the family's first
    /// registered model, so a plain VCED dump reports the DX21.
    pub fn identify(&self, data: &[u8]) -> Option<&'static DeviceDescriptor> {
        let codecs: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.descriptor, (e.factory)(&DeviceSettings::default())))
            .collect();
        split_frames(data).find_map(|frame| {
            codecs
                .iter()
                .find(|(_, codec)| codec.recognize(frame))
                .map(|(descriptor, _)| *descriptor)
        })
    }

    /// Returns the number of registered devices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no devices are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id.eq_ignore_ascii_case(id))
    }
}
