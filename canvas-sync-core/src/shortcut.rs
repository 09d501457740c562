//! URL shortcut files in the format native to the host platform.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::naming::append_extension;

/// Write a URL shortcut next to `path`, in the host platform's native
/// format. Returns the artifact path and whether anything was written; an
/// existing shortcut is left untouched.
pub fn make_url_shortcut(url: &str, path: &Path) -> io::Result<(PathBuf, bool)> {
    #[cfg(target_os = "macos")]
    return write_webloc(url, path);
    #[cfg(target_os = "linux")]
    return write_desktop_entry(url, path);
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    return write_internet_shortcut(url, path);
}

fn write_if_absent(target: PathBuf, content: String) -> io::Result<(PathBuf, bool)> {
    if target.exists() {
        return Ok((target, false));
    }
    fs::write(&target, content)?;
    Ok((target, true))
}

/// macOS `.webloc`: an XML property list with a single URL key.
pub fn write_webloc(url: &str, path: &Path) -> io::Result<(PathBuf, bool)> {
    let content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
<key>URL</key>
<string>{url}</string>
</dict>
</plist>"#
    );
    write_if_absent(append_extension(path, ".webloc"), content)
}

/// Linux `.desktop` link entry.
pub fn write_desktop_entry(url: &str, path: &Path) -> io::Result<(PathBuf, bool)> {
    let name = url.rsplit('/').next().unwrap_or(url);
    let content = format!(
        "[Desktop Entry]\nEncoding=UTF-8\nName={name}\nType=Link\nURL={url}\nIcon=text-html"
    );
    write_if_absent(append_extension(path, ".desktop"), content)
}

/// Windows-style `.url` internet shortcut.
pub fn write_internet_shortcut(url: &str, path: &Path) -> io::Result<(PathBuf, bool)> {
    let content = format!("[InternetShortcut]\nURL={url}");
    write_if_absent(append_extension(path, ".url"), content)
}
