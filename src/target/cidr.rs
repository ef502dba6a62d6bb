use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;

use crate::error::ScanError;

/// An IPv4 block. Host bits of the parsed address are masked away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrBlock {
    net: Ipv4Net,
}

impl CidrBlock {
    /// Parse `a.b.c.d/p`. A bare address is taken as a `/32`.
    pub fn parse(input: &str) -> Result<Self, ScanError> {
        let trimmed = input.trim();
        let invalid = |reason: String| ScanError::InvalidCidr {
            input: input.to_string(),
            reason,
        };

        let net = if trimmed.contains('/') {
            Ipv4Net::from_str(trimmed).map_err(|e| invalid(e.to_string()))?
        } else {
            let addr = Ipv4Addr::from_str(trimmed).map_err(|e| invalid(e.to_string()))?;
            Ipv4Net::new(addr, 32).map_err(|e| invalid(e.to_string()))?
        };

        Ok(Self { net: net.trunc() })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.net.network()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.net.broadcast()
    }

    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// Number of addresses in the block, network and broadcast included.
    pub fn len(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len()))
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.net.contains(&addr)
    }

    /// Every address of the block in ascending order.
    pub fn addresses(&self) -> Addresses {
        Addresses {
            next: Some(self.network()),
            last: self.broadcast(),
        }
    }
}

impl FromStr for CidrBlock {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}

impl IntoIterator for &CidrBlock {
    type Item = Ipv4Addr;
    type IntoIter = Addresses;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses()
    }
}

/// Lazy walk from the network address to the broadcast address.
#[derive(Debug, Clone)]
pub struct Addresses {
    next: Option<Ipv4Addr>,
    last: Ipv4Addr,
}

impl Iterator for Addresses {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current == self.last {
            None
        } else {
            increment(current)
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(current) => {
                let remaining = u64::from(u32::from(self.last)) - u64::from(u32::from(current)) + 1;
                let n = usize::try_from(remaining).unwrap_or(usize::MAX);
                (n, usize::try_from(remaining).ok())
            }
            None => (0, Some(0)),
        }
    }
}

impl std::iter::FusedIterator for Addresses {}

/// Next address with the carry cascading into the higher octets.
/// `None` once `255.255.255.255` is passed.
pub fn increment(addr: Ipv4Addr) -> Option<Ipv4Addr> {
    let mut octets = addr.octets();
    for octet in octets.iter_mut().rev() {
        let (value, overflowed) = octet.overflowing_add(1);
        *octet = value;
        if !overflowed {
            return Some(Ipv4Addr::from(octets));
        }
    }
    None
}
