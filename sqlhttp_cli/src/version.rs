use sqlhttp_core::configuration::Configuration;

/// Get the full version of the program (e.g. "sqlhttp/0.1.0 Ubuntu/24.04/x86_64").
pub(crate) fn full_version(configuration: &Configuration) -> String {
    let program_name = &configuration.program_name;
    let version = &configuration.version;
    let info = os_info::get();
    let os = format!("{}", info.os_type()).replace(' ', "-");
    let os_version = info.version();
    let architecture = info.architecture().unwrap_or("unknown");

    format!("{program_name}/{version} {os}/{os_version}/{architecture}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PROGRAM_NAME: &str = "test-program";
    const TEST_VERSION: &str = "1.2.3";

    #[test]
    fn test_full_version() {
        let configuration = Configuration {
            program_name: TEST_PROGRAM_NAME.to_string(),
            version: TEST_VERSION.to_string(),
            ..Default::default()
        };
        let version_prefix = format!("{TEST_PROGRAM_NAME}/{TEST_VERSION} ");

        let version = full_version(&configuration);

        assert!(version.starts_with(version_prefix.as_str()));
        let os = version.trim_start_matches(version_prefix.as_str());
        assert!(os.split('/').count() >= 3, "{version}");
    }
}
