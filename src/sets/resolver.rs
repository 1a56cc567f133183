//! Name resolution used while expanding address lists.

use std::io;
use std::net::IpAddr;

/// Resolves a configured token into the addresses it stands for.
pub trait Resolver {
    /// Look up every address for `host`. An empty answer is reported as an error.
    fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system's lookup facilities.
///
/// An IP literal is reverse-resolved to its host name and that name is
/// resolved forward again, so every address of the host joins the set.
/// Anything else is resolved forward directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let name = match host.parse::<IpAddr>() {
            Ok(ip) => {
                let name = dns_lookup::lookup_addr(&ip)?;
                // getnameinfo falls back to the numeric form when there is no PTR record
                if name.parse::<IpAddr>().is_ok() {
                    return Err(no_record(host));
                }
                name
            }
            Err(_) => host.to_string(),
        };

        let mut addrs = dns_lookup::lookup_host(&name)?;
        addrs.sort();
        addrs.dedup();
        if addrs.is_empty() {
            return Err(no_record(&name));
        }
        Ok(addrs)
    }
}

fn no_record(host: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no address records for '{}'", host),
    )
}

/// Resolver that never finds anything; used when lookups are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl Resolver for NoopResolver {
    fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("address lookups disabled, skipping '{}'", host),
        ))
    }
}
