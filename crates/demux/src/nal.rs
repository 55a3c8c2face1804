//! VVC (H.266) NAL unit header inspection and start code search.

/// Annex-B start code (4 bytes).
pub const ANNEXB_START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// The 3-byte start code prefix every Annex-B start code ends with.
pub const START_CODE_PREFIX: [u8; 3] = [0x00, 0x00, 0x01];

/// NAL unit type for VVC (ITU-T H.266 table 5).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VvcNalType {
    Trail,
    Stsa,
    Radl,
    Rasl,
    IdrWRadl,
    IdrNLp,
    Cra,
    Gdr,
    Opi,
    Dci,
    Vps,
    Sps,
    Pps,
    PrefixAps,
    SuffixAps,
    Ph,
    Aud,
    Eos,
    Eob,
    PrefixSei,
    SuffixSei,
    Fd,
    /// Reserved or unspecified type.
    Other(u8),
}

impl From<u8> for VvcNalType {
    fn from(val: u8) -> Self {
        match val & 0x1F {
            0 => Self::Trail,
            1 => Self::Stsa,
            2 => Self::Radl,
            3 => Self::Rasl,
            7 => Self::IdrWRadl,
            8 => Self::IdrNLp,
            9 => Self::Cra,
            10 => Self::Gdr,
            12 => Self::Opi,
            13 => Self::Dci,
            14 => Self::Vps,
            15 => Self::Sps,
            16 => Self::Pps,
            17 => Self::PrefixAps,
            18 => Self::SuffixAps,
            19 => Self::Ph,
            20 => Self::Aud,
            21 => Self::Eos,
            22 => Self::Eob,
            23 => Self::PrefixSei,
            24 => Self::SuffixSei,
            25 => Self::Fd,
            other => Self::Other(other),
        }
    }
}

impl VvcNalType {
    /// Raw `nal_unit_type` value.
    pub fn code(self) -> u8 {
        match self {
            Self::Trail => 0,
            Self::Stsa => 1,
            Self::Radl => 2,
            Self::Rasl => 3,
            Self::IdrWRadl => 7,
            Self::IdrNLp => 8,
            Self::Cra => 9,
            Self::Gdr => 10,
            Self::Opi => 12,
            Self::Dci => 13,
            Self::Vps => 14,
            Self::Sps => 15,
            Self::Pps => 16,
            Self::PrefixAps => 17,
            Self::SuffixAps => 18,
            Self::Ph => 19,
            Self::Aud => 20,
            Self::Eos => 21,
            Self::Eob => 22,
            Self::PrefixSei => 23,
            Self::SuffixSei => 24,
            Self::Fd => 25,
            Self::Other(code) => code,
        }
    }

    /// Coded slice data (types 0..=11).
    pub fn is_vcl(self) -> bool {
        self.code() <= 11
    }

    /// Intra random access point (IDR or CRA).
    pub fn is_irap(self) -> bool {
        matches!(self, Self::IdrWRadl | Self::IdrNLp | Self::Cra)
    }

    pub fn is_parameter_set(self) -> bool {
        matches!(self, Self::Opi | Self::Dci | Self::Vps | Self::Sps | Self::Pps)
    }
}

/// The two-byte VVC NAL unit header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NalHeader {
    pub layer_id: u8,
    pub nal_type: VvcNalType,
    /// `nuh_temporal_id_plus1 - 1`.
    pub temporal_id: u8,
}

impl NalHeader {
    /// Parse the header at the start of a NAL unit (start code stripped).
    ///
    /// Returns `None` for units shorter than two bytes or with a zero
    /// `nuh_temporal_id_plus1`.
    pub fn parse(nal: &[u8]) -> Option<Self> {
        let [first, second, ..] = *nal else {
            return None;
        };
        let temporal_id_plus1 = second & 0x07;
        if temporal_id_plus1 == 0 {
            return None;
        }
        Some(Self {
            layer_id: first & 0x3F,
            nal_type: VvcNalType::from(second >> 3),
            temporal_id: temporal_id_plus1 - 1,
        })
    }
}

/// Extract the NAL unit type of a NAL unit (start code stripped).
pub fn nal_unit_type(nal: &[u8]) -> Option<VvcNalType> {
    NalHeader::parse(nal).map(|header| header.nal_type)
}

/// Position of the next 3-byte start code prefix at or after `from`.
pub fn find_start_code(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(START_CODE_PREFIX.len())
        .position(|window| window == START_CODE_PREFIX)
        .map(|pos| pos + from)
}
