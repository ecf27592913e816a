//! Windows enumeration backend: SetupAPI, filtered to the ports device class.
//!
//! Walks the present members of `GUID_DEVCLASS_PORTS` and reads each node's
//! friendly name. The parenthesised `COMn` token inside the friendly name is
//! the address callers pass to `open`; the full friendly name becomes the
//! descriptor label.

use super::PortDescriptor;
use std::mem;
use std::ptr;
use winapi::shared::devguid::GUID_DEVCLASS_PORTS;
use winapi::shared::minwindef::{BYTE, DWORD};
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::setupapi::{
    SetupDiDestroyDeviceInfoList, SetupDiEnumDeviceInfo, SetupDiGetClassDevsW,
    SetupDiGetDeviceRegistryPropertyW, DIGCF_PRESENT, SPDRP_FRIENDLYNAME, SP_DEVINFO_DATA,
};

/// Friendly-name buffer size, in UTF-16 units.
const PROPERTY_BUFFER_LEN: usize = 256;

pub(super) fn list_ports() -> Vec<PortDescriptor> {
    let mut ports = Vec::new();

    unsafe {
        let device_info_set = SetupDiGetClassDevsW(
            &GUID_DEVCLASS_PORTS,
            ptr::null(),
            ptr::null_mut(),
            DIGCF_PRESENT,
        );
        if device_info_set == INVALID_HANDLE_VALUE {
            // Catalog unavailable reads as zero ports, never as an error.
            return ports;
        }

        let mut device_info_data: SP_DEVINFO_DATA = mem::zeroed();
        device_info_data.cbSize = mem::size_of::<SP_DEVINFO_DATA>() as DWORD;

        let mut index: DWORD = 0;
        while SetupDiEnumDeviceInfo(device_info_set, index, &mut device_info_data) != 0 {
            index += 1;

            let mut buffer = [0u16; PROPERTY_BUFFER_LEN];
            let mut required_size: DWORD = 0;
            let ok = SetupDiGetDeviceRegistryPropertyW(
                device_info_set,
                &mut device_info_data,
                SPDRP_FRIENDLYNAME,
                ptr::null_mut(),
                buffer.as_mut_ptr() as *mut BYTE,
                (buffer.len() * mem::size_of::<u16>()) as DWORD,
                &mut required_size,
            );
            if ok == 0 {
                continue;
            }

            let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
            let friendly = String::from_utf16_lossy(&buffer[..len]);
            let name = com_token(&friendly).unwrap_or_else(|| friendly.clone());
            ports.push(PortDescriptor::labeled(name, friendly));
        }

        SetupDiDestroyDeviceInfoList(device_info_set);
    }

    ports
}

/// Pull the `COMn` address out of a friendly name like
/// `"USB Serial Device (COM7)"`.
fn com_token(friendly: &str) -> Option<String> {
    let start = friendly.rfind("(COM")? + 1;
    let rest = &friendly[start..];
    let end = rest.find(')')?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_com_token_extraction() {
        assert_eq!(
            com_token("USB Serial Device (COM7)"),
            Some("COM7".to_string())
        );
        assert_eq!(
            com_token("Arduino Uno (COM11)"),
            Some("COM11".to_string())
        );
        assert_eq!(com_token("Printer Port (LPT1)"), None);
        assert_eq!(com_token("Bare Device"), None);
    }

    #[test]
    fn test_com_token_uses_last_parenthesised_group() {
        assert_eq!(
            com_token("Bridge (rev 2) (COM3)"),
            Some("COM3".to_string())
        );
    }
}
