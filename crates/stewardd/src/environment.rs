//! Detects the values substituted for configuration placeholders.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::path::{Path, PathBuf};

use tracing::debug;

use steward_config::Config;
use steward_tree::Environment;

const ENVIRONMENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::environment");

/// Address the probe socket is pointed at. Connecting a UDP socket only
/// selects a route; nothing is sent.
const ROUTE_PROBE: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 9);

const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Builds the placeholder environment from runtime configuration.
///
/// Explicit settings win. Otherwise the network address is the local address
/// of the default route and the deploy directory is the directory holding
/// the configuration tree.
#[must_use]
pub fn detect(config: &Config) -> Environment {
    let network_address = config
        .network_address()
        .map_or_else(|| detect_network_address().to_string(), str::to_owned);
    let deploy_dir = config.deploy_dir().map_or_else(
        || deploy_dir_for(config.tree_path().as_std_path()),
        |dir| dir.to_string(),
    );
    debug!(
        target: ENVIRONMENT_TARGET,
        network_address = %network_address,
        deploy_dir = %deploy_dir,
        "placeholder environment detected"
    );
    Environment::new(network_address, deploy_dir)
}

/// Returns the local address used to reach the default route, or loopback
/// when no route exists.
#[must_use]
pub fn detect_network_address() -> IpAddr {
    probe_route().unwrap_or(LOOPBACK)
}

fn probe_route() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(ROUTE_PROBE).ok()?;
    let address = socket.local_addr().ok()?.ip();
    (!address.is_unspecified()).then_some(address)
}

fn deploy_dir_for(tree_path: &Path) -> String {
    let directory = match tree_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let absolute = std::path::absolute(&directory)
        .or_else(|_| env::current_dir())
        .unwrap_or(directory);
    absolute.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn explicit_settings_win() {
        let config = Config {
            network_address: Some("10.1.2.3".to_owned()),
            deploy_dir: Some("/opt/db".into()),
            ..Config::default()
        };
        let environment = detect(&config);
        assert_eq!(environment.network_address(), "10.1.2.3");
        assert_eq!(environment.deploy_dir(), "/opt/db");
    }

    #[rstest]
    fn deploy_dir_defaults_to_tree_parent() {
        let config = Config {
            tree_path: "/srv/steward/config.json".into(),
            network_address: Some("10.1.2.3".to_owned()),
            ..Config::default()
        };
        assert_eq!(detect(&config).deploy_dir(), "/srv/steward");
    }

    #[rstest]
    fn bare_tree_file_uses_the_working_directory() {
        let expected = env::current_dir().expect("current dir");
        let resolved = PathBuf::from(deploy_dir_for(Path::new("config.json")));
        assert_eq!(
            resolved.canonicalize().expect("canonical deploy dir"),
            expected.canonicalize().expect("canonical current dir")
        );
    }

    #[rstest]
    fn detected_address_is_never_unspecified() {
        assert!(!detect_network_address().is_unspecified());
    }
}
