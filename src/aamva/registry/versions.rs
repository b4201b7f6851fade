//! Format version tables.
//!
//! Field lengths follow the AAMVA DL/ID Card Design Standard. The order of
//! the fields in each version is the order in which they are written into
//! the subfile.
use super::{enumerations, format_version, EnumOption, VersionDeclaration};

pub(crate) static VERSIONS: &[VersionDeclaration] = &[
    format_version! {
        "01" => "Legacy format (pre-2000)", YearMonthDay {
            DAQ: String(25) required => "Customer ID Number",
            DCS: String(40) required => "Customer Family Name",
            DAC: String(40) required => "Customer First Name",
            DBB: Date(8) required => "Date of Birth",
            DBA: Date(8) required => "Document Expiration Date",
            DBC: Char(1) optional => "Physical Description - Sex" ["M" => "Male", "F" => "Female"],
            DAG: String(35) required => "Address - Street 1",
            DAI: String(20) required => "Address - City",
            DAJ: String(2) required => "Address - Jurisdiction Code",
            DAK: Zip(11) required => "Address - Postal Code",
            DAY: String(3) optional => "Physical Description - Eye Color",
            DAU: String(6) optional => "Physical Description - Height",
        }
    },
    format_version! {
        "04" => "2005-era AAMVA standard", MonthDayYear {
            DAQ: String(25) required => "Customer ID Number",
            DCS: String(40) required => "Customer Family Name",
            DAC: String(40) required => "Customer First Name",
            DAD: String(40) optional => "Customer Middle Name(s)",
            DBD: Date(8) required => "Document Issue Date",
            DBB: Date(8) required => "Date of Birth",
            DBA: Date(8) required => "Document Expiration Date",
            DAG: String(35) required => "Address - Street 1",
            DAI: String(20) required => "Address - City",
            DAJ: String(2) required => "Address - Jurisdiction Code",
            DAK: Zip(11) required => "Address - Postal Code",
            DAY: String(3) required => "Physical Description - Eye Color",
            DAU: String(6) required => "Physical Description - Height",
        }
    },
    format_version! {
        "07" => "Modern AAMVA format, widely adopted", MonthDayYear {
            DAQ: String(25) required => "Customer ID Number",
            DCS: String(40) required => "Customer Family Name",
            DAC: String(40) required => "Customer First Name",
            DAD: String(40) optional => "Customer Middle Name(s)",
            DBD: Date(8) required => "Document Issue Date",
            DBB: Date(8) required => "Date of Birth",
            DBA: Date(8) required => "Document Expiration Date",
            DBC: Char(1) required => "Physical Description - Sex",
            DAY: String(3) required => "Physical Description - Eye Color",
            DAU: String(6) required => "Physical Description - Height",
            DAG: String(35) required => "Address - Street 1",
            DAI: String(20) required => "Address - City",
            DAJ: String(2) required => "Address - Jurisdiction Code",
            DAK: Zip(11) required => "Address - Postal Code",
            DCF: String(25) optional => "Document Discriminator",
            DCG: String(3) optional => "Country Identification",
        }
    },
    format_version! {
        "08" => "Current AAMVA standard, used by most states", MonthDayYear {
            DAQ: String(25) required => "Customer ID Number",
            DCS: String(40) required => "Customer Family Name",
            DAC: String(40) required => "Customer First Name",
            DAD: String(40) optional => "Customer Middle Name(s)",
            DBD: Date(8) required => "Document Issue Date",
            DBB: Date(8) required => "Date of Birth",
            DBA: Date(8) required => "Document Expiration Date",
            DBC: Char(1) required => "Physical Description - Sex",
            DAU: String(6) required => "Physical Description - Height",
            DAY: String(3) required => "Physical Description - Eye Color",
            DAG: String(35) required => "Address - Street 1",
            DAI: String(20) required => "Address - City",
            DAJ: String(2) required => "Address - Jurisdiction Code",
            DAK: Zip(11) required => "Address - Postal Code",
            DCF: String(25) optional => "Document Discriminator",
            DCG: String(3) optional => "Country Identification",
            DDE: Char(1) optional => "Family Name Truncation",
            DDF: Char(1) optional => "First Name Truncation",
            DDG: Char(1) optional => "Middle Name Truncation",
        }
    },
    format_version! {
        "09" => "2009+ US/Canada harmonization with alias fields", MonthDayYear {
            DAA: String(125) optional => "Customer Full Name",
            DAQ: String(25) required => "Customer ID Number",
            DCS: String(40) required => "Customer Family Name",
            DAC: String(40) required => "Customer First Name",
            DAD: String(40) optional => "Customer Middle Name(s)",
            DBD: Date(8) optional => "Document Issue Date",
            DBB: Date(8) required => "Date of Birth",
            DBA: Date(8) required => "Document Expiration Date",
            DBC: Char(1) required => "Physical Description - Sex",
            DAU: String(6) optional => "Physical Description - Height",
            DAY: String(3) optional => "Physical Description - Eye Color",
            DAG: String(35) required => "Address - Street 1",
            DAI: String(20) required => "Address - City",
            DAJ: String(2) required => "Address - Jurisdiction Code",
            DAK: Zip(11) required => "Address - Postal Code",
            DAW: String(3) optional => "Physical Description - Weight (pounds)",
            DAZ: String(12) optional => "Hair Color",
            DCI: String(33) optional => "Place of Birth",
            DCJ: String(25) optional => "Audit Information",
            DCK: String(25) optional => "Inventory Control Number",
            DBG: String(15) optional => "Alias / AKA Given Name",
            DBN: String(10) optional => "Alias / AKA Family Name",
            DBS: String(5) optional => "Alias / AKA Suffix Name",
            DCU: String(5) optional => "Name Suffix",
        }
    },
    format_version! {
        "10" => "REAL ID + mobile DL compatibility expansion", MonthDayYear {
            DAQ: String(25) required => "Customer ID Number",
            DCS: String(40) required => "Customer Family Name",
            DAC: String(40) required => "Customer First Name",
            DAD: String(40) optional => "Customer Middle Name(s)",
            DBD: Date(8) required => "Document Issue Date",
            DBB: Date(8) required => "Date of Birth",
            DBA: Date(8) required => "Document Expiration Date",
            DBC: Char(1) required => "Physical Description - Sex",
            DAU: String(6) required => "Physical Description - Height",
            DAY: String(3) required => "Physical Description - Eye Color",
            DAG: String(35) required => "Address - Street 1",
            DAI: String(20) required => "Address - City",
            DAJ: String(2) required => "Address - Jurisdiction Code",
            DAK: Zip(11) required => "Address - Postal Code",
            DCF: String(25) optional => "Document Discriminator",
            DCG: String(3) optional => "Country Identification",
            DCH: String(4) optional => "Federal Commercial Vehicle Codes",
            DDA: Char(1) optional => "Compliance Type",
            DDB: Date(8) optional => "Card Revision Date",
            DDC: Date(8) optional => "HAZMAT Endorsement Expiration Date",
            DDD: Char(1) optional => "Limited Duration Document Indicator",
            DDE: Char(1) optional => "Family Name Truncation",
            DDF: Char(1) optional => "First Name Truncation",
            DDG: Char(1) optional => "Middle Name Truncation",
        }
    },
];

/// Registry-level value sets, used by every field whose declaration does not
/// carry its own.
pub(crate) static ENUMERATIONS: &[(&str, &[EnumOption])] = enumerations! {
    DBC {
        "1" => "Male",
        "2" => "Female",
        "9" => "Not specified",
    },
    DAY {
        "BLK" => "Black",
        "BLU" => "Blue",
        "BRO" => "Brown",
        "GRY" => "Gray",
        "GRN" => "Green",
        "HAZ" => "Hazel",
        "MAR" => "Maroon",
        "PNK" => "Pink",
        "DIC" => "Dichromatic",
        "UNK" => "Unknown",
    },
    DAZ {
        "BAL" => "Bald",
        "BLK" => "Black",
        "BLN" => "Blond",
        "BRO" => "Brown",
        "GRY" => "Gray",
        "RED" => "Red/Auburn",
        "SDY" => "Sandy",
        "WHI" => "White",
        "UNK" => "Unknown",
    },
    DCG {
        "USA" => "United States",
        "CAN" => "Canada",
    },
    DDA {
        "F" => "Fully compliant",
        "N" => "Non-compliant",
    },
    DDD {
        "1" => "Temporary lawful status",
    },
    DDE {
        "T" => "Truncated",
        "N" => "Not truncated",
        "U" => "Unknown",
    },
    DDF {
        "T" => "Truncated",
        "N" => "Not truncated",
        "U" => "Unknown",
    },
    DDG {
        "T" => "Truncated",
        "N" => "Not truncated",
        "U" => "Unknown",
    },
};
