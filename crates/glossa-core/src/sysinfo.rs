//! Host system information, rendered for prompt injection.

/// OS and platform information as a Markdown block.
pub fn system_info_markdown() -> String {
    format!(
        "**System Information:**\n\n\
         - OS: {}\n\
         - Architecture: {}\n\
         - Family: {}\n\
         - CPU Count: {}\n",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::env::consts::FAMILY,
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_os_and_arch() {
        let info = system_info_markdown();
        assert!(info.contains(std::env::consts::OS));
        assert!(info.contains(std::env::consts::ARCH));
    }
}
