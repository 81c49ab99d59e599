// TODO: walk lsof output once there is a macOS box to test against
pub fn is_port_open(_port_name: &str) -> bool {
    false
}
