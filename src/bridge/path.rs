// ABOUTME: Host path translation for bridged environments.
// ABOUTME: Drive-letter paths map onto the bridge's mount prefix.

/// Translate a host path into the path seen inside the bridge.
///
/// `C:\Users\me` becomes `<prefix>/c/Users/me`. POSIX paths pass through.
/// UNC paths only have their separators normalized.
pub fn to_bridge_path(path: &str, mount_prefix: &str) -> String {
    if path.starts_with("\\\\") {
        return path.replace('\\', "/");
    }

    let bytes = path.as_bytes();
    let is_drive = bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'\\' || bytes[2] == b'/');
    if !is_drive {
        return path.to_string();
    }

    let drive = (bytes[0] as char).to_ascii_lowercase();
    let prefix = mount_prefix.trim_end_matches('/');
    let rest = path[2..].replace('\\', "/");
    let rest = rest.trim_matches('/');

    if rest.is_empty() {
        format!("{prefix}/{drive}")
    } else {
        format!("{prefix}/{drive}/{rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_paths() {
        assert_eq!(to_bridge_path(r"C:\Users\me", "/mnt"), "/mnt/c/Users/me");
        assert_eq!(to_bridge_path("D:/work/app/", "/mnt/"), "/mnt/d/work/app");
        assert_eq!(to_bridge_path("C:", "/mnt"), "/mnt/c");
        assert_eq!(to_bridge_path(r"E:\", "/host"), "/host/e");
    }

    #[test]
    fn posix_and_unc() {
        assert_eq!(to_bridge_path("/srv/x", "/mnt"), "/srv/x");
        assert_eq!(to_bridge_path(r"\\server\share\dir", "/mnt"), "//server/share/dir");
        assert_eq!(to_bridge_path("C:relative", "/mnt"), "C:relative");
    }
}
