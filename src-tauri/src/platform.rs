#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Platform name in the form web content written for desktop shells expects.
    pub fn content_name(self) -> &'static str {
        match self {
            Self::MacOs => "darwin",
            Self::Windows => "win32",
            Self::Linux => "linux",
        }
    }

    pub fn is_mac(self) -> bool {
        self == Self::MacOs
    }
}

#[cfg(test)]
mod tests {
    use super::Platform;

    #[test]
    fn content_name_matches_conventional_identifiers() {
        assert_eq!(Platform::MacOs.content_name(), "darwin");
        assert_eq!(Platform::Windows.content_name(), "win32");
        assert_eq!(Platform::Linux.content_name(), "linux");
    }
}
