// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CIDR value type used for the client-side activation-safety hint.
//!
//! Parsing normalizes host bits away, so `192.168.1.77/24` stores as
//! `192.168.1.0/24`. Matching is a pure prefix comparison; the server
//! remains the authority on whether a request is actually allowed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// A normalized IP network. A bare address parses as a full-length
/// prefix (`/32` or `/128`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    network: IpAddr,
    prefix_len: u8,
}

impl Cidr {
    /// The masked network address.
    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Whether `ip` falls inside this network. Address families never
    /// match across each other.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                mask_v4(ip, self.prefix_len) == net
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                mask_v6(ip, self.prefix_len) == net
            }
            _ => false,
        }
    }
}

fn mask_v4(ip: Ipv4Addr, prefix_len: u8) -> Ipv4Addr {
    let mask = if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    };
    Ipv4Addr::from(u32::from(ip) & mask)
}

fn mask_v6(ip: Ipv6Addr, prefix_len: u8) -> Ipv6Addr {
    let mask = if prefix_len == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix_len))
    };
    Ipv6Addr::from(u128::from(ip) & mask)
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

/// Error parsing a CIDR string.
#[derive(Debug, thiserror::Error)]
pub enum CidrParseError {
    #[error("Invalid IP address: {0}")]
    Address(String),

    #[error("Invalid prefix length: {0}")]
    PrefixLength(String),
}

impl FromStr for Cidr {
    type Err = CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_part, len_part) = match s.split_once('/') {
            Some((a, l)) => (a, Some(l)),
            None => (s, None),
        };

        let addr: IpAddr = addr_part
            .parse()
            .map_err(|_| CidrParseError::Address(addr_part.to_string()))?;

        let max_len: u8 = if addr.is_ipv4() { 32 } else { 128 };
        let prefix_len = match len_part {
            Some(l) => {
                let len: u8 = l
                    .parse()
                    .map_err(|_| CidrParseError::PrefixLength(l.to_string()))?;
                if len > max_len {
                    return Err(CidrParseError::PrefixLength(l.to_string()));
                }
                len
            }
            None => max_len,
        };

        let network = match addr {
            IpAddr::V4(ip) => IpAddr::V4(mask_v4(ip, prefix_len)),
            IpAddr::V6(ip) => IpAddr::V6(mask_v6(ip, prefix_len)),
        };

        Ok(Self {
            network,
            prefix_len,
        })
    }
}

impl Serialize for Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
