//! Front-panel controller movements.
//!
//! The Venom reports knob moves as plain CCs or NRPNs rather than
//! single-parameter SysEx. [`apply_controller`] folds one into a patch so an
//! editor can follow the panel.

use patchwire_core::ParameterModel;
use tracing::trace;

/// One incoming controller message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// 7-bit control change.
    Cc {
        /// Controller number.
        number: u8,
        /// Value, 0..=127.
        value: u8,
    },
    /// 14-bit NRPN.
    Nrpn {
        /// Parameter number.
        number: u16,
        /// Value, 0..=16383.
        value: u16,
    },
}

/// CCs that write their value straight into one key.
const DIRECT_CCS: &[(u8, &str)] = &[
    (71, "resonance"),
    (103, "mod1scaling"),
    (104, "mod2scaling"),
    (50, "fmlevel"),
    (51, "ringmod"),
    (30, "osc2coarsetune"),
    (62, "osc2finetune"),
    (31, "osc3coarsetune"),
    (63, "osc3finetune"),
    (20, "env2attack"),
    (22, "env2decay"),
    (23, "env2sustain"),
    (24, "env2release"),
    (73, "env1attack"),
    (75, "env1decay"),
    (79, "env1sustain"),
    (72, "env1release"),
    (86, "lfo1rate"),
    (14, "lfo2rate"),
    (15, "lfo2waveform"),
    (5, "glidetime"),
    (7, "channelvolume"),
    (10, "channelpan"),
    (91, "channelaux1send"),
    (93, "channelaux2send"),
];

const NRPN_OSC2_SYNC: u16 = 2 * 128 + 125;
const NRPN_OSC3_SYNC: u16 = 2 * 128 + 126;
const NRPN_UNISON: u16 = 2 * 128 + 106;
const NRPN_INSERT_FX: u16 = 2 * 128 + 32;

/// Applies `event` to `model`. Returns the key it changed, or `None` when
/// the controller is unmapped or its value is out of range.
pub fn apply_controller(model: &mut dyn ParameterModel, event: ControllerEvent) -> Option<&'static str> {
    let key = match event {
        ControllerEvent::Cc { number, value } => apply_cc(model, number, i32::from(value & 0x7F)),
        ControllerEvent::Nrpn { number, value } => apply_nrpn(model, number, i32::from(value)),
    };
    if let Some(key) = key {
        trace!(key, ?event, "controller applied");
    }
    key
}

fn apply_cc(model: &mut dyn ParameterModel, number: u8, value: i32) -> Option<&'static str> {
    if let Some(&(_, key)) = DIRECT_CCS.iter().find(|(n, _)| *n == number) {
        model.set(key, value);
        return Some(key);
    }
    let cutoff = model.get_or("cutoff", 0);
    match number {
        3 => model.set("cutoff", cutoff % 128 + value * 128),
        35 => model.set("cutoff", cutoff / 128 * 128 + value),
        70 if value <= 6 => {
            model.set("filtertype", value);
            return Some("filtertype");
        }
        126 => {
            model.set("voicemode", 0);
            return Some("voicemode");
        }
        127 => {
            model.set("voicemode", 1);
            return Some("voicemode");
        }
        65 => {
            model.set("glidemode", i32::from(value >= 64));
            return Some("glidemode");
        }
        _ => return None,
    }
    Some("cutoff")
}

fn apply_nrpn(model: &mut dyn ParameterModel, number: u16, value: i32) -> Option<&'static str> {
    let msb = value / 128;
    let flag = i32::from(msb >= 64);
    let (key, v) = match number {
        NRPN_OSC2_SYNC => ("osc2sync", flag),
        NRPN_OSC3_SYNC => ("osc3sync", flag),
        NRPN_UNISON => ("unisonmode", flag),
        NRPN_INSERT_FX if msb <= 5 => ("channelfxtype", msb),
        _ => return None,
    };
    model.set(key, v);
    Some(key)
}
