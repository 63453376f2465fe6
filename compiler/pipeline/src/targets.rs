//! Target resolution.

use descriptor::{File, Registry, RegistryError};

/// Look up each requested file, keeping the requested order.
///
/// Stops at the first name that is not in the registry.
pub fn resolve_targets<'r, S>(
    registry: &'r Registry,
    names: &[S],
) -> Result<Vec<&'r File>, RegistryError>
where
    S: AsRef<str>,
{
    names.iter().map(|name| registry.lookup_file(name.as_ref())).collect()
}
