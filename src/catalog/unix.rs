//! POSIX enumeration backend: scan `/dev` for serial-looking device nodes.
//!
//! Entries whose file name starts with `tty` are reported with their full
//! path as the port name. There is no label source here, so `label` stays
//! `None`.

use super::PortDescriptor;
use std::fs;
use std::path::Path;

const DEV_DIR: &str = "/dev";
const TTY_PREFIX: &str = "tty";

pub(super) fn list_ports() -> Vec<PortDescriptor> {
    scan_dir(Path::new(DEV_DIR))
}

/// Scan one directory for serial device nodes.
///
/// Any failure to read the directory degrades to an empty result; callers
/// treat "catalog unavailable" as "zero ports".
pub fn scan_dir(dir: &Path) -> Vec<PortDescriptor> {
    let mut ports = Vec::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return ports,
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if name.starts_with(TTY_PREFIX) {
            ports.push(PortDescriptor::named(entry.path().display().to_string()));
        }
    }

    ports
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::File;

    #[test]
    fn test_scan_filters_by_tty_prefix() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["ttyUSB0", "ttyS1", "ttyACM0", "sda", "null"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let mut names: Vec<String> = scan_dir(dir.path())
            .into_iter()
            .map(|p| p.name)
            .collect();
        names.sort();

        let expected: Vec<String> = ["ttyACM0", "ttyS1", "ttyUSB0"]
            .iter()
            .map(|n| dir.path().join(n).display().to_string())
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_scan_empty_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_dir(dir.path()).is_empty());
    }

    #[test]
    fn test_scan_missing_dir_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("no-such-subdir");
        assert!(scan_dir(&gone).is_empty());
    }

    #[test]
    fn test_scan_has_no_labels() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("ttyUSB0")).unwrap();

        let ports = scan_dir(dir.path());
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].label, None);
    }
}
