//! Identifier arithmetic on the 160-bit ring.
use std::fmt;
use std::ops::Add;
use std::ops::Neg;
use std::ops::Sub;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use sha1::Digest;
use sha1::Sha1;

use crate::consts::RING_BITS;
use crate::error::Error;
use crate::error::Result;

/// Did is an element of the finite ring R(P) where P = 2^160, stored as 20
/// big-endian bytes. Node ids are the SHA-1 digest of the node's transport
/// address; key ids are the SHA-1 digest of the key.
#[derive(Copy, Clone, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Did([u8; 20]);

impl Did {
    /// Hash an arbitrary string onto the ring.
    pub fn hash_of(value: &str) -> Self {
        Did(Sha1::digest(value.as_bytes()).into())
    }

    /// Clockwise distance from `self` to `other`: `(other - self) mod 2^160`.
    pub fn distance(&self, other: Did) -> Did {
        other - *self
    }

    /// Transform this Did to its position viewed from `origin`.
    pub fn bias(&self, origin: Did) -> BiasId {
        BiasId::new(origin, *self)
    }

    /// Decimal rendering used on the wire, where fixed-width integers would
    /// truncate 160-bit values.
    pub fn to_decimal_string(self) -> String {
        BigUint::from(self).to_str_radix(10)
    }

    /// Parse the wire decimal rendering.
    pub fn from_decimal_string(s: &str) -> Result<Self> {
        let n = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| Error::InvalidDecimalId(s.to_string()))?;
        Ok(n.into())
    }
}

/// Test whether `v` lies in the ring interval from `start` to `end` with the
/// given endpoint inclusivity. A degenerate interval (`start == end`) is
/// empty unless either endpoint is inclusive, in which case it is the whole
/// ring. Wraparound intervals are handled by comparing clockwise distances
/// from `start`.
pub fn in_range(v: Did, start: Did, end: Did, incl_start: bool, incl_end: bool) -> bool {
    if start == end {
        return incl_start || incl_end;
    }
    if v == start {
        return incl_start;
    }
    if v == end {
        return incl_end;
    }
    start.distance(v) < start.distance(end)
}

/// A Did rebased on another Did, so that comparisons follow the clockwise
/// order as seen from the base.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct BiasId {
    bias: Did,
    did: Did,
}

impl BiasId {
    pub fn new(bias: Did, did: Did) -> BiasId {
        BiasId {
            bias,
            did: did - bias,
        }
    }

    /// Clockwise distance from the base.
    pub fn pos(&self) -> Did {
        self.did
    }

    pub fn to_did(self) -> Did {
        self.did + self.bias
    }
}

impl PartialOrd for BiasId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BiasId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if other.bias != self.bias {
            let rebased = BiasId::new(self.bias, other.to_did());
            self.did.cmp(&rebased.did)
        } else {
            self.did.cmp(&other.did)
        }
    }
}

/// Sort a list of Dids by clockwise distance from a base Did.
pub trait SortRing {
    fn sort(&mut self, did: Did);
}

impl SortRing for Vec<Did> {
    fn sort(&mut self, did: Did) {
        self.sort_by_key(|x| *x - did);
    }
}

impl From<Did> for BigUint {
    fn from(did: Did) -> BigUint {
        BigUint::from_bytes_be(&did.0)
    }
}

impl From<BigUint> for Did {
    fn from(n: BigUint) -> Self {
        let wrapped = n % (BigUint::from(2u16).pow(RING_BITS as u32));
        let mut tail = wrapped.to_bytes_be();
        let mut bytes = vec![0u8; 20 - tail.len()];
        bytes.append(&mut tail);
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Self(out)
    }
}

impl From<u32> for Did {
    fn from(n: u32) -> Self {
        Self::from(BigUint::from(n))
    }
}

impl From<[u8; 20]> for Did {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Neg for Did {
    type Output = Self;
    fn neg(self) -> Self {
        let ret = BigUint::from(2u16).pow(RING_BITS as u32) - BigUint::from(self);
        ret.into()
    }
}

impl Add for Did {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        ((BigUint::from(self) + BigUint::from(rhs)) % (BigUint::from(2u16).pow(RING_BITS as u32)))
            .into()
    }
}

impl Sub for Did {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl FromStr for Did {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        if bytes.len() != 20 {
            return Err(Error::BadHexId(hex::FromHexError::InvalidStringLength));
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl Serialize for Did {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Did::from_decimal_string(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_ring_arithmetic() {
        let zero = Did::from(0u32);
        let a = Did::hash_of("10.0.0.1:7401");
        assert_eq!(-a + a, zero);
        assert_eq!(-(-a), a);
        assert_eq!(a - a, zero);
        assert_eq!(zero - a, -a);
        assert_eq!(
            Did::from(0u32),
            Did::from(BigUint::from(2u16).pow(RING_BITS as u32))
        );
    }

    #[test]
    fn test_hash_is_deterministic() {
        let a = Did::hash_of("10.0.0.1:7401");
        let b = Did::hash_of("10.0.0.1:7401");
        let c = Did::hash_of("10.0.0.1:7402");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sort_ring() {
        let (a, b, c, d) = (
            Did::from(10u32),
            Did::from(20u32),
            Did::from(30u32),
            Did::from(40u32),
        );
        let mut v = vec![c, b, a, d];
        v.sort(a);
        assert_eq!(v, vec![a, b, c, d]);
        v.sort(b);
        assert_eq!(v, vec![b, c, d, a]);
        v.sort(d);
        assert_eq!(v, vec![d, a, b, c]);
    }

    #[test]
    fn test_in_range_plain() {
        let (a, b, c) = (Did::from(10u32), Did::from(20u32), Did::from(30u32));
        assert!(in_range(b, a, c, false, false));
        assert!(!in_range(a, a, c, false, false));
        assert!(in_range(a, a, c, true, false));
        assert!(!in_range(c, a, c, false, false));
        assert!(in_range(c, a, c, false, true));
        assert!(!in_range(Did::from(40u32), a, c, true, true));
    }

    #[test]
    fn test_in_range_wraparound() {
        let (a, b) = (Did::from(40u32), Did::from(10u32));
        // (40, 10] crosses zero
        assert!(in_range(Did::from(50u32), a, b, false, true));
        assert!(in_range(Did::from(0u32), a, b, false, true));
        assert!(in_range(b, a, b, false, true));
        assert!(!in_range(Did::from(20u32), a, b, false, true));
        assert!(!in_range(a, a, b, false, true));
    }

    #[test]
    fn test_in_range_degenerate() {
        let (a, b) = (Did::from(10u32), Did::from(25u32));
        // empty unless an endpoint is inclusive, then the whole ring
        assert!(!in_range(b, a, a, false, false));
        assert!(!in_range(a, a, a, false, false));
        assert!(in_range(b, a, a, true, false));
        assert!(in_range(b, a, a, false, true));
    }

    #[test]
    fn test_bias_order() {
        let (a, b, c) = (Did::from(10u32), Did::from(20u32), Did::from(30u32));
        // viewed from b, c comes before a
        assert!(c.bias(b) < a.bias(b));
        assert!(b.bias(a) < c.bias(a));
        assert_eq!(a.bias(b).to_did(), a);
    }

    #[test]
    fn test_decimal_roundtrip() {
        let a = Did::hash_of("10.0.0.1:7401");
        let s = a.to_decimal_string();
        assert_eq!(Did::from_decimal_string(&s).unwrap(), a);
        assert!(Did::from_decimal_string("not a number").is_err());
    }

    #[test]
    fn test_hex_roundtrip() {
        let a = Did::hash_of("10.0.0.1:7401");
        let s = a.to_string();
        assert_eq!(Did::from_str(&s).unwrap(), a);
    }
}
