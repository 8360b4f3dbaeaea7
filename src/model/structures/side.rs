use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::convert::TryFrom;
use strum_macros::EnumIter;

#[derive(Deserialize_repr, Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[repr(u8)]
pub enum Side {
    One = 1,
    Two = 2
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One
        }
    }
}

impl TryFrom<i32> for Side {
    type Error = ();

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Side::One),
            2 => Ok(Side::Two),
            _ => Err(())
        }
    }
}

/// A value held for each of the two sides of a match or lobby.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sides<T> {
    pub one: T,
    pub two: T
}

impl<T> Sides<T> {
    pub fn new(one: T, two: T) -> Self {
        Sides { one, two }
    }

    /// Builds both slots by evaluating `f` for each side, side one first.
    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        let one = f(Side::One);
        let two = f(Side::Two);

        Sides { one, two }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::One => &self.one,
            Side::Two => &self.two
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::One => &mut self.one,
            Side::Two => &mut self.two
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Sides<U> {
        Sides {
            one: f(self.one),
            two: f(self.two)
        }
    }

    pub fn as_ref(&self) -> Sides<&T> {
        Sides {
            one: &self.one,
            two: &self.two
        }
    }
}

impl<T> Sides<Option<T>> {
    /// Returns both values only when each side has one.
    pub fn both(self) -> Option<Sides<T>> {
        match (self.one, self.two) {
            (Some(one), Some(two)) => Some(Sides { one, two }),
            _ => None
        }
    }
}
