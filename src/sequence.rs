//! Counter sequences over a scalar domain.
//!
//! `sequence[i] = (start ± i * step) mod 2^BITS` for `i` in `0..count`, with addresses taken
//! as big-endian integers. Everything here is pure: no allocation besides the optional
//! `collect`, no shared state.

use crate::value::{domain_mask, Domain};
use std::iter::FusedIterator;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increment,
    Decrement,
}

/// Lazy iterator over the values of a counter.
#[derive(Debug, Clone)]
pub struct Sequence<T> {
    next: u128,
    step: u128,
    remaining: u32,
    direction: Direction,
    _domain: PhantomData<T>,
}

impl<T: Domain> Iterator for Sequence<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.remaining -= 1;
        self.next = advance::<T>(current, self.step, self.direction);
        Some(T::from_int(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl<T: Domain> ExactSizeIterator for Sequence<T> {}

impl<T: Domain> FusedIterator for Sequence<T> {}

fn advance<T: Domain>(value: u128, step: u128, direction: Direction) -> u128 {
    let next = match direction {
        Direction::Increment => value.wrapping_add(step),
        Direction::Decrement => value.wrapping_sub(step),
    };
    next & domain_mask::<T>()
}

/// Iterator over `count` values starting at `start`.
pub fn sequence<T: Domain>(start: T, step: T, count: u32, direction: Direction) -> Sequence<T> {
    Sequence {
        next: start.to_int() & domain_mask::<T>(),
        step: step.to_int() & domain_mask::<T>(),
        remaining: count,
        direction,
        _domain: PhantomData,
    }
}

pub fn increment<T: Domain>(start: T, step: T, count: u32) -> Vec<T> {
    sequence(start, step, count, Direction::Increment).collect()
}

pub fn decrement<T: Domain>(start: T, step: T, count: u32) -> Vec<T> {
    sequence(start, step, count, Direction::Decrement).collect()
}

/// The `index`-th value of a counter, without walking the preceding ones.
pub fn nth<T: Domain>(start: T, step: T, index: u64, direction: Direction) -> T {
    let offset = step.to_int().wrapping_mul(index as u128);
    T::from_int(advance::<T>(start.to_int(), offset, direction))
}

/// Additive inverse of `step` modulo `2^BITS`.
pub fn negate<T: Domain>(step: T) -> T {
    T::from_int(step.to_int().wrapping_neg() & domain_mask::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::MacAddress;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn uint32_wraps() {
        assert_eq!(increment(u32::MAX, 1, 2), vec![u32::MAX, 0]);
        assert_eq!(decrement(0u32, 1, 3), vec![0, u32::MAX, u32::MAX - 1]);
    }

    #[test]
    fn ipv4_wraps() {
        let seq = increment(Ipv4Addr::BROADCAST, Ipv4Addr::new(0, 0, 0, 1), 2);
        assert_eq!(seq, vec![Ipv4Addr::BROADCAST, Ipv4Addr::new(0, 0, 0, 0)]);
    }

    #[test]
    fn ipv4_step_carries_across_octets() {
        let seq = increment(Ipv4Addr::new(10, 0, 0, 255), Ipv4Addr::new(0, 0, 0, 1), 2);
        assert_eq!(seq[1], Ipv4Addr::new(10, 0, 1, 0));
        let seq = increment(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(0, 1, 0, 0), 3);
        assert_eq!(seq[2], Ipv4Addr::new(10, 2, 0, 0));
    }

    #[test]
    fn ipv6_wraps_at_128_bits() {
        let max = Ipv6Addr::from(u128::MAX);
        assert_eq!(increment(max, Ipv6Addr::UNIT, 2), vec![max, Ipv6Addr::UNSPECIFIED]);
    }

    #[test]
    fn mac_wraps_at_48_bits() {
        let seq = increment(MacAddress::BROADCAST, MacAddress::UNIT, 2);
        assert_eq!(seq, vec![MacAddress::BROADCAST, MacAddress::ZERO]);
    }

    #[test]
    fn nth_matches_iteration() {
        let start = Ipv4Addr::new(192, 168, 0, 250);
        let step = Ipv4Addr::new(0, 0, 0, 3);
        let all = increment(start, step, 10);
        for (i, v) in all.iter().enumerate() {
            assert_eq!(nth(start, step, i as u64, Direction::Increment), *v);
        }
    }

    #[test]
    fn decrement_is_increment_of_negated_step() {
        let start = MacAddress::new([0, 0, 0, 0, 0, 2]);
        let step = MacAddress::new([0, 0, 0, 0, 0, 5]);
        assert_eq!(decrement(start, step, 4), increment(start, negate(step), 4));
    }

    #[test]
    fn zero_count_is_empty() {
        let seq = sequence(5u32, 1, 0, Direction::Increment);
        assert_eq!(seq.len(), 0);
        assert_eq!(seq.count(), 0);
    }
}
