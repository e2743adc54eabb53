use std::env;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const TARGET: &str = "x86_64-unknown-none";
const KERNEL_CRATE: &str = "kernel_bootstrap";
const KERNEL_FEATURES: &str = "kernel";
const LIMINE_VENDOR_DIR: &str = "third_party/limine";
const ISO_OUTPUT: &str = "dist/vga-console.iso";
const SERIAL_LOG: &str = "dist/serial.log";

/// Line the kernel logs once the banner is on screen
const SMOKE_MARKER: &str = "vga console online";
const SMOKE_TIMEOUT: Duration = Duration::from_secs(20);

type XtaskResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> XtaskResult {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("build") => build_kernel(&repo_root()?),
        Some("iso") => cmd_iso(),
        Some("qemu") => cmd_qemu(),
        Some("qemu-smoke") => cmd_qemu_smoke(),
        Some("limine-fetch") => cmd_limine_fetch(args),
        _ => usage(),
    }
}

fn usage() -> XtaskResult {
    println!("Usage:");
    println!("  cargo xtask build");
    println!("  cargo xtask iso");
    println!("  cargo xtask qemu");
    println!("  cargo xtask qemu-smoke");
    println!("  cargo xtask limine-fetch [--repo <url>] [--branch <name>] [--source <path>]");
    Err(io::Error::new(ErrorKind::Other, "unknown xtask command").into())
}

fn repo_root() -> io::Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "xtask must live under workspace root"))
}

fn cmd_iso() -> XtaskResult {
    let root = repo_root()?;
    let vendor = root.join(LIMINE_VENDOR_DIR);
    ensure_limine_files(&vendor)?;

    build_kernel(&root)?;
    let staging = stage_iso(&root, &vendor)?;
    build_iso(&root, &staging)?;
    install_limine(&root, &vendor)?;

    println!("ISO ready: {}", root.join(ISO_OUTPUT).display());
    Ok(())
}

fn cmd_qemu() -> XtaskResult {
    let root = repo_root()?;
    let iso = require_iso(&root)?;
    let serial_log = prepare_serial_log(&root)?;

    println!("QEMU: VGA text console in the QEMU window");
    println!("      serial log in {SERIAL_LOG}");

    run(qemu_command(&root, &iso, &serial_log)
        .arg("-display")
        .arg("gtk"))
}

/// Boots headless and waits for the console banner to reach the serial log
fn cmd_qemu_smoke() -> XtaskResult {
    let root = repo_root()?;
    let iso = require_iso(&root)?;
    let serial_log = prepare_serial_log(&root)?;

    let mut child = qemu_command(&root, &iso, &serial_log)
        .arg("-display")
        .arg("none")
        .stdin(Stdio::null())
        .spawn()?;

    let started = Instant::now();
    let mut passed = false;
    while started.elapsed() < SMOKE_TIMEOUT {
        let log = fs::read_to_string(&serial_log).unwrap_or_default();
        if log.contains(SMOKE_MARKER) {
            passed = true;
            break;
        }
        if log.contains("KERNEL PANIC") || child.try_wait()?.is_some() {
            break;
        }
        thread::sleep(Duration::from_millis(200));
    }

    let _ = child.kill();
    let _ = child.wait();

    if passed {
        println!("QEMU smoke test: PASS (console banner logged)");
        Ok(())
    } else {
        let log = fs::read_to_string(&serial_log).unwrap_or_default();
        eprintln!("--- {SERIAL_LOG} ---\n{log}");
        Err(io::Error::new(
            ErrorKind::Other,
            "QEMU smoke test: FAIL (console banner not logged)",
        )
        .into())
    }
}

fn qemu_command(root: &Path, iso: &Path, serial_log: &Path) -> Command {
    let mut command = Command::new("qemu-system-x86_64");
    command
        .current_dir(root)
        .arg("-machine")
        .arg("pc")
        .arg("-m")
        .arg("128M")
        .arg("-vga")
        .arg("std")
        .arg("-cdrom")
        .arg(iso)
        .arg("-serial")
        .arg(format!("file:{}", serial_log.display()))
        .arg("-no-reboot");
    command
}

fn require_iso(root: &Path) -> io::Result<PathBuf> {
    let iso = root.join(ISO_OUTPUT);
    if iso.exists() {
        Ok(iso)
    } else {
        Err(io::Error::new(
            ErrorKind::NotFound,
            format!("missing {ISO_OUTPUT}; run cargo xtask iso first"),
        ))
    }
}

fn prepare_serial_log(root: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(root.join("dist"))?;
    let serial_log = root.join(SERIAL_LOG);
    if serial_log.exists() {
        fs::remove_file(&serial_log)?;
    }
    Ok(serial_log)
}

fn build_kernel(root: &Path) -> XtaskResult {
    run(Command::new("cargo")
        .current_dir(root)
        .env("RUSTFLAGS", "-C relocation-model=static")
        .arg("build")
        .arg("-p")
        .arg(KERNEL_CRATE)
        .arg("--bin")
        .arg(KERNEL_CRATE)
        .arg("--features")
        .arg(KERNEL_FEATURES)
        .arg("--target")
        .arg(TARGET))
}

fn stage_iso(root: &Path, vendor: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let staging = root.join("target/iso_root");
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }

    fs::create_dir_all(staging.join("boot/limine"))?;
    fs::create_dir_all(staging.join("EFI/BOOT"))?;

    copy_file(
        root.join("boot/limine.conf"),
        staging.join("boot/limine/limine.conf"),
    )?;

    let kernel_path = root
        .join("target")
        .join(TARGET)
        .join("debug")
        .join(KERNEL_CRATE);
    if !kernel_path.exists() {
        return Err(io::Error::new(
            ErrorKind::NotFound,
            format!("missing kernel binary at {}", kernel_path.display()),
        )
        .into());
    }
    copy_file(kernel_path, staging.join("boot/kernel.elf"))?;

    for file in ["limine-bios.sys", "limine-bios-cd.bin", "limine-uefi-cd.bin"] {
        copy_file(vendor.join(file), staging.join("boot/limine").join(file))?;
    }
    copy_file(
        vendor.join("BOOTX64.EFI"),
        staging.join("EFI/BOOT/BOOTX64.EFI"),
    )?;

    Ok(staging)
}

fn build_iso(root: &Path, staging: &Path) -> XtaskResult {
    fs::create_dir_all(root.join("dist"))?;
    let iso = root.join(ISO_OUTPUT);

    run(Command::new("xorriso")
        .current_dir(root)
        .arg("-as")
        .arg("mkisofs")
        .arg("-R")
        .arg("-J")
        .arg("-b")
        .arg("boot/limine/limine-bios-cd.bin")
        .arg("-no-emul-boot")
        .arg("-boot-load-size")
        .arg("4")
        .arg("-boot-info-table")
        .arg("--efi-boot")
        .arg("boot/limine/limine-uefi-cd.bin")
        .arg("-efi-boot-part")
        .arg("--efi-boot-image")
        .arg("--protective-msdos-label")
        .arg("-o")
        .arg(&iso)
        .arg(staging))
}

fn install_limine(root: &Path, vendor: &Path) -> XtaskResult {
    let iso = root.join(ISO_OUTPUT);
    let limine = vendor.join("limine");

    if !limine.exists() {
        eprintln!("Warning: no limine host utility found, ISO will be UEFI-only");
        return Ok(());
    }

    // A host binary for the wrong architecture still leaves a UEFI-bootable ISO.
    if let Err(e) = run(Command::new(limine)
        .current_dir(root)
        .arg("bios-install")
        .arg(&iso))
    {
        eprintln!("Warning: limine bios-install failed ({e}), continuing with UEFI-only boot");
    }
    Ok(())
}

const LIMINE_ASSETS: [&str; 4] = [
    "limine-bios.sys",
    "limine-bios-cd.bin",
    "limine-uefi-cd.bin",
    "BOOTX64.EFI",
];

fn ensure_limine_files(vendor: &Path) -> XtaskResult {
    let missing: Vec<&str> = LIMINE_ASSETS
        .into_iter()
        .filter(|file| !vendor.join(file).exists())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(io::Error::new(
            ErrorKind::NotFound,
            format!(
                "missing Limine files in {}: {:?} (run cargo xtask limine-fetch)",
                vendor.display(),
                missing
            ),
        )
        .into())
    }
}

fn cmd_limine_fetch(mut args: impl Iterator<Item = String>) -> XtaskResult {
    let mut repo = "https://codeberg.org/Limine/Limine.git".to_string();
    let mut branch = "v10.x-binary".to_string();
    let mut source: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        let mut value = || {
            args.next().ok_or_else(|| {
                io::Error::new(ErrorKind::InvalidInput, format!("{arg} expects a value"))
            })
        };
        match arg.as_str() {
            "--repo" => repo = value()?,
            "--branch" => branch = value()?,
            "--source" => source = Some(PathBuf::from(value()?)),
            _ => {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("unknown argument: {arg}"),
                )
                .into());
            }
        }
    }

    let root = repo_root()?;
    let vendor = root.join(LIMINE_VENDOR_DIR);
    fs::create_dir_all(&vendor)?;

    let limine_root = match source {
        Some(source) => source,
        None => {
            let clone_dir = root.join("target/limine-src");
            if clone_dir.exists() {
                fs::remove_dir_all(&clone_dir)?;
            }
            run(Command::new("git")
                .current_dir(&root)
                .arg("clone")
                .arg("--depth=1")
                .arg("--branch")
                .arg(&branch)
                .arg(&repo)
                .arg(&clone_dir))?;
            clone_dir
        }
    };

    copy_limine_assets(&limine_root, &vendor)?;
    println!("Limine assets copied to {}", vendor.display());
    Ok(())
}

fn copy_limine_assets(src: &Path, dest: &Path) -> XtaskResult {
    for file in LIMINE_ASSETS {
        let path = find_file(src, file).ok_or_else(|| {
            io::Error::new(
                ErrorKind::NotFound,
                format!("could not find {file} under {}", src.display()),
            )
        })?;
        copy_file(path, dest.join(file))?;
    }

    if let Some(path) = find_file(src, "limine") {
        copy_file(path, dest.join("limine"))?;
        make_executable(&dest.join("limine"))?;
    }

    if let Some(license) = find_file(src, "LICENSE").or_else(|| find_file(src, "COPYING")) {
        copy_file(license, dest.join("LICENSE"))?;
    }

    Ok(())
}

fn find_file(root: &Path, name: &str) -> Option<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let file_name = path.file_name().and_then(|n| n.to_str());
            if path.is_file() && file_name == Some(name) {
                return Some(path);
            }
            if path.is_dir() && file_name != Some(".git") {
                stack.push(path);
            }
        }
    }
    None
}

fn copy_file(src: PathBuf, dest: PathBuf) -> XtaskResult {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&src, &dest).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("copy {} -> {}: {err}", src.display(), dest.display()),
        )
    })?;
    Ok(())
}

fn make_executable(path: &Path) -> XtaskResult {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

fn run(command: &mut Command) -> XtaskResult {
    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let program = command.get_program().to_string_lossy().to_string();
    let args: Vec<String> = command
        .get_args()
        .map(|arg| arg.to_string_lossy().to_string())
        .collect();
    let full_command = format!("{} {}", program, args.join(" "));

    let status = match command.status() {
        Ok(status) => status,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(io::Error::new(
                ErrorKind::NotFound,
                format!("{program} not found; ensure it is installed and on PATH"),
            )
            .into());
        }
        Err(err) => return Err(err.into()),
    };
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(
            ErrorKind::Other,
            format!("command `{}` failed with status {}", full_command.trim_end(), status),
        )
        .into())
    }
}
