use super::Rect;
use crate::common::*;

/// Bounding box in corner format `(x_min, y_min, x_max, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XYXY<T> {
    pub(crate) x_min: T,
    pub(crate) y_min: T,
    pub(crate) x_max: T,
    pub(crate) y_max: T,
}

impl<T> XYXY<T> {
    pub fn map<U, F>(self, mut f: F) -> XYXY<U>
    where
        F: FnMut(T) -> U,
    {
        XYXY {
            x_min: f(self.x_min),
            y_min: f(self.y_min),
            x_max: f(self.x_max),
            y_max: f(self.y_max),
        }
    }

    pub fn try_cast<V>(self) -> Option<XYXY<V>>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        Some(XYXY {
            x_min: V::from(self.x_min)?,
            y_min: V::from(self.y_min)?,
            x_max: V::from(self.x_max)?,
            y_max: V::from(self.y_max)?,
        })
    }

    pub fn cast<V>(self) -> XYXY<V>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        self.try_cast().unwrap()
    }
}

impl<T> XYXY<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Builds a box from its corners as given, without checking their order.
    pub fn from_corners(x_min: T, y_min: T, x_max: T, y_max: T) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Builds the box of `w × h` pixels centered at `(cx, cy)`.
    ///
    /// The corners are `cx ∓ (w − 1) / 2` and `cy ∓ (h − 1) / 2`, so that
    /// [`Rect::w`] and [`Rect::h`] give back `w` and `h`. Sizes below one
    /// pixel produce crossed corners.
    pub fn from_center_size(cx: T, cy: T, w: T, h: T) -> Self {
        let one = T::one();
        let two = one + one;
        let half_w = (w - one) / two;
        let half_h = (h - one) / two;

        Self {
            x_min: cx - half_w,
            y_min: cy - half_h,
            x_max: cx + half_w,
            y_max: cy + half_h,
        }
    }

    /// Shifts both corners by `(dx, dy)`.
    pub fn translate(&self, dx: T, dy: T) -> Self {
        Self {
            x_min: self.x_min + dx,
            y_min: self.y_min + dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }
}

impl<T> XYXY<T>
where
    T: Float,
{
    /// Rounds every corner with the given rounding function.
    pub fn round_with<F>(&self, round: F) -> Self
    where
        F: Fn(T) -> T,
    {
        self.map(round)
    }
}

impl<T> Rect for XYXY<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn x_min(&self) -> Self::Type {
        self.x_min
    }

    fn y_min(&self) -> Self::Type {
        self.y_min
    }

    fn x_max(&self) -> Self::Type {
        self.x_max
    }

    fn y_max(&self) -> Self::Type {
        self.y_max
    }

    fn cx(&self) -> Self::Type {
        let two = T::one() + T::one();
        (self.x_min + self.x_max) / two
    }

    fn cy(&self) -> Self::Type {
        let two = T::one() + T::one();
        (self.y_min + self.y_max) / two
    }

    fn w(&self) -> Self::Type {
        self.x_max - self.x_min + T::one()
    }

    fn h(&self) -> Self::Type {
        self.y_max - self.y_min + T::one()
    }

    fn try_from_xyxy(xyxy: [Self::Type; 4]) -> Result<Self> {
        let [x_min, y_min, x_max, y_max] = xyxy;
        ensure!(
            x_max >= x_min && y_max >= y_min,
            "x_max >= x_min and y_max >= y_min must hold"
        );

        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }
}
