//! Integration tests for patchwire-cli.
//!
//! Every run points `XDG_CONFIG_HOME` at a scratch directory so a user
//! configuration never leaks into the results.

use patchwire_core::{BankCodec, DeviceSettings, Patch};
use patchwire_devices::{Yamaha4Op, Yamaha4OpModel};
use std::path::Path;
use std::process::{Command, Output};

/// Runs the `patchwire` binary with an isolated config directory.
fn patchwire(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_patchwire"))
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run patchwire")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

// ---------------------------------------------------------------------------
// `patchwire devices`
// ---------------------------------------------------------------------------

#[test]
fn devices_lists_every_model() {
    let home = tempfile::tempdir().unwrap();
    let output = patchwire(home.path(), &["devices"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("Supported Devices"));
    for id in [
        "venom",
        "venom-multi",
        "venom-arp",
        "venom-global",
        "dx21",
        "dx27",
        "tx81z",
        "dx11",
        "tq5",
        "v50",
        "tx81z-perf",
        "dx11-perf",
        "fb01",
    ] {
        assert!(out.contains(id), "listing should contain '{id}'");
    }
}

#[test]
fn devices_json_filters_by_family() {
    let home = tempfile::tempdir().unwrap();
    let output = patchwire(home.path(), &["devices", "--family", "yamaha4op", "--json"]);
    assert!(output.status.success());

    let rows = json(&output);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 8);
    assert!(rows.iter().all(|r| r["family"] == "yamaha4op"));
    assert_eq!(rows[0]["id"], "dx21");
}

#[test]
fn devices_json_lists_venom_dump_kinds() {
    let home = tempfile::tempdir().unwrap();
    let output = patchwire(home.path(), &["devices", "--family", "venom", "--json"]);
    assert!(output.status.success());

    let rows = json(&output);
    let ids: Vec<&str> = rows.as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["venom", "venom-multi", "venom-arp", "venom-global"]);
}

#[test]
fn devices_rejects_unknown_family() {
    let home = tempfile::tempdir().unwrap();
    let output = patchwire(home.path(), &["devices", "--family", "moog"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `patchwire pack` / `patchwire unpack`
// ---------------------------------------------------------------------------

#[test]
fn pack_output_is_seven_bit_and_unpacks() {
    let home = tempfile::tempdir().unwrap();
    let packed = patchwire(home.path(), &["pack", "01 FF 80 7F"]);
    assert!(packed.status.success());

    let packed = stdout(&packed);
    let packed = packed.trim();
    for byte in packed.split_whitespace() {
        let value = u8::from_str_radix(byte, 16).unwrap();
        assert!(value <= 0x7F, "packed byte {byte} has its high bit set");
    }

    let unpacked = patchwire(home.path(), &["unpack", packed]);
    assert!(unpacked.status.success());
    assert_eq!(stdout(&unpacked).trim(), "01 FF 80 7F");
}

#[test]
fn pack_rejects_bad_hex() {
    let home = tempfile::tempdir().unwrap();
    let output = patchwire(home.path(), &["pack", "F0 4"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `patchwire encode` / `decode` / `info`
// ---------------------------------------------------------------------------

#[test]
fn factory_patch_encodes_and_decodes() {
    let home = tempfile::tempdir().unwrap();
    let syx = home.path().join("init.syx");

    let encoded = patchwire(home.path(), &["encode", "venom_init", "-o", path_arg(&syx)]);
    assert!(encoded.status.success(), "{}", String::from_utf8_lossy(&encoded.stderr));
    assert!(syx.exists());

    let decoded = patchwire(home.path(), &["decode", path_arg(&syx)]);
    assert!(decoded.status.success());
    let out = stdout(&decoded);
    assert!(out.contains("Init Saw"));
    assert!(out.contains("M-Audio Venom"));

    let decoded = patchwire(home.path(), &["decode", path_arg(&syx), "--json"]);
    let patch = json(&decoded);
    assert_eq!(patch["device"], "venom");
    assert_eq!(patch["name"], "Init Saw");
    assert_eq!(patch["params"]["osc1waveform"], 1);
}

#[test]
fn decode_saves_patch_file() {
    let home = tempfile::tempdir().unwrap();
    let syx = home.path().join("fb.syx");
    let toml = home.path().join("fb.toml");

    let encoded = patchwire(home.path(), &["encode", "fb01_init", "-o", path_arg(&syx)]);
    assert!(encoded.status.success());

    let decoded = patchwire(home.path(), &["decode", path_arg(&syx), "-o", path_arg(&toml)]);
    assert!(decoded.status.success());

    let saved = std::fs::read_to_string(&toml).unwrap();
    assert!(saved.contains("device = \"fb01\""));
    assert!(saved.contains("name = \"INIT\""));
}

#[test]
fn encode_without_output_prints_hex_frames() {
    let home = tempfile::tempdir().unwrap();
    let output = patchwire(home.path(), &["encode", "yamaha4op_init"]);
    assert!(output.status.success());

    let out = stdout(&output);
    let frames: Vec<&str> = out.lines().collect();
    assert_eq!(frames.len(), 4);
    assert!(frames.iter().all(|f| f.starts_with("F0 43") && f.ends_with("F7")));
}

#[test]
fn info_reports_frames_and_device() {
    let home = tempfile::tempdir().unwrap();
    let syx = home.path().join("voice.syx");
    let encoded = patchwire(
        home.path(),
        &["encode", "yamaha4op_init", "--device", "dx21", "-o", path_arg(&syx)],
    );
    assert!(encoded.status.success());

    let output = patchwire(home.path(), &["info", path_arg(&syx), "--json"]);
    assert!(output.status.success());

    let report = json(&output);
    let frames = report["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 4);
    assert_eq!(report["stray_bytes"], 0);
    assert_eq!(report["unterminated"], false);
    assert!(frames.iter().all(|f| f["device"] == "dx21"));
}

#[test]
fn decode_rejects_foreign_data() {
    let home = tempfile::tempdir().unwrap();
    let syx = home.path().join("junk.syx");
    std::fs::write(&syx, [0xF0, 0x7E, 0x00, 0x06, 0x01, 0xF7]).unwrap();

    let output = patchwire(home.path(), &["decode", path_arg(&syx), "--device", "venom"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `patchwire bank`
// ---------------------------------------------------------------------------

fn write_vmem_bank(path: &Path) {
    let codec = Yamaha4Op::new(Yamaha4OpModel::Dx21, DeviceSettings::default());
    let voices: Vec<Patch> = (0..32).map(|i| Patch::new(&format!("VOICE {i:02}"))).collect();
    std::fs::write(path, codec.emit_bank(&voices)).unwrap();
}

#[test]
fn bank_list_names_every_voice() {
    let home = tempfile::tempdir().unwrap();
    let syx = home.path().join("bank.syx");
    write_vmem_bank(&syx);

    let output = patchwire(home.path(), &["bank", "list", path_arg(&syx), "--json"]);
    assert!(output.status.success());

    let report = json(&output);
    assert_eq!(report["device"], "dx21");
    let names = report["patches"].as_array().unwrap();
    assert_eq!(names.len(), 32);
    assert_eq!(names[0], "VOICE 00");
    assert_eq!(names[31], "VOICE 31");
}

#[test]
fn decode_index_reads_bank_voice() {
    let home = tempfile::tempdir().unwrap();
    let syx = home.path().join("bank.syx");
    write_vmem_bank(&syx);

    let output = patchwire(home.path(), &["decode", path_arg(&syx), "--index", "7", "--json"]);
    assert!(output.status.success());
    assert_eq!(json(&output)["name"], "VOICE 07");

    let output = patchwire(home.path(), &["decode", path_arg(&syx), "--index", "40"]);
    assert!(!output.status.success());
}

#[test]
fn bank_build_then_extract() {
    let home = tempfile::tempdir().unwrap();
    let syx = home.path().join("fb.syx");
    let toml = home.path().join("first.toml");

    let built = patchwire(home.path(), &["bank", "build", "fb01_init", "-o", path_arg(&syx)]);
    assert!(built.status.success(), "{}", String::from_utf8_lossy(&built.stderr));

    let listed = patchwire(home.path(), &["bank", "list", path_arg(&syx), "--json"]);
    let report = json(&listed);
    assert_eq!(report["device"], "fb01");
    assert_eq!(report["patches"].as_array().unwrap().len(), 48);
    assert_eq!(report["patches"][0], "INIT");

    let extracted = patchwire(
        home.path(),
        &["bank", "extract", path_arg(&syx), "--index", "0", "-o", path_arg(&toml)],
    );
    assert!(extracted.status.success());
    assert!(std::fs::read_to_string(&toml).unwrap().contains("name = \"INIT\""));
}

// ---------------------------------------------------------------------------
// `patchwire request`
// ---------------------------------------------------------------------------

#[test]
fn request_current_dump_for_four_op() {
    let home = tempfile::tempdir().unwrap();
    let output = patchwire(home.path(), &["request", "--device", "dx21", "--channel", "2"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "F0 43 22 03 F7");
}

#[test]
fn request_consecutive_venom_patches() {
    let home = tempfile::tempdir().unwrap();
    let syx = home.path().join("req.syx");
    let output = patchwire(
        home.path(),
        &[
            "request", "--device", "venom", "--bank", "0", "--number", "127", "--count", "3",
            "-o", path_arg(&syx),
        ],
    );
    assert!(output.status.success());

    let info = patchwire(home.path(), &["info", path_arg(&syx), "--json"]);
    assert_eq!(json(&info)["frames"].as_array().unwrap().len(), 3);
}

#[test]
fn request_rejects_unknown_device() {
    let home = tempfile::tempdir().unwrap();
    let output = patchwire(home.path(), &["request", "--device", "juno"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("juno"));
}

// ---------------------------------------------------------------------------
// `patchwire config`
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
#[test]
fn config_init_writes_once() {
    let home = tempfile::tempdir().unwrap();
    let output = patchwire(home.path(), &["config", "init"]);
    assert!(output.status.success());
    assert!(home.path().join("patchwire").join("config.toml").exists());

    let again = patchwire(home.path(), &["config", "init"]);
    assert!(!again.status.success());

    let forced = patchwire(home.path(), &["config", "init", "--force"]);
    assert!(forced.status.success());
}

#[cfg(target_os = "linux")]
#[test]
fn configured_device_is_the_default() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("patchwire");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "device = \"dx21\"\nchannel = 5\n").unwrap();

    let output = patchwire(home.path(), &["request"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "F0 43 25 03 F7");
}
