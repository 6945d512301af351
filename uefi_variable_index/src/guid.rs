/***************************************************************************************************
 * Copyright (c) 2022, Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
//! `EFI_GUID` and `EFI_TIME`, as carried in variable metadata.

/// A UEFI variable namespace GUID. Distinct from `rpc_common::Uuid`, which
/// identifies RPC service interfaces rather than variable namespaces — the
/// two happen to share a wire shape but not a meaning.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Guid(pub [u8; 16]);

impl Guid {
    pub const fn new(bytes: [u8; 16]) -> Self {
        Guid(bytes)
    }
}

/// `EFI_TIME` as used by the authentication engine. `Ord` is derived in
/// field-declaration order, which is year-down-to-second — the
/// significance order the UEFI spec actually cares about. Comparisons are
/// only meaningful once `pad1`, `nanosecond`, `time_zone`, `daylight` and
/// `pad2` have been checked to be zero, which the authentication engine
/// does before ever comparing two timestamps (§4.8).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct EfiTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub pad1: u8,
    pub nanosecond: u32,
    pub time_zone: i16,
    pub daylight: u8,
    pub pad2: u8,
}

impl EfiTime {
    pub fn is_padding_zeroed(&self) -> bool {
        self.pad1 == 0 && self.nanosecond == 0 && self.time_zone == 0 && self.daylight == 0 && self.pad2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_year_orders_after_earlier_year() {
        let t1 = EfiTime { year: 2022, ..Default::default() };
        let t2 = EfiTime { year: 2023, ..Default::default() };
        assert!(t2 > t1);
    }

    #[test]
    fn same_year_orders_by_month_then_day() {
        let t1 = EfiTime { year: 2022, month: 1, day: 5, ..Default::default() };
        let t2 = EfiTime { year: 2022, month: 1, day: 6, ..Default::default() };
        assert!(t2 > t1);
    }
}
