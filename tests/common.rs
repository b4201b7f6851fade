use aamva_pdf417::FieldValueMap;

pub const NY_FIELDS: [(&str, &str); 16] = [
    ("DAQ", "V12345678"),
    ("DCS", "VERA"),
    ("DAC", "SEAN"),
    ("DAD", "MARIE"),
    ("DBD", "01152024"),
    ("DBB", "01011990"),
    ("DBA", "12312030"),
    ("DBC", "2"),
    ("DAU", "065 IN"),
    ("DAY", "GRN"),
    ("DAG", "350 5TH AVE"),
    ("DAI", "NEW YORK"),
    ("DAJ", "NY"),
    ("DAK", "10001"),
    ("DCF", "NY0123456789"),
    ("DCG", "USA"),
];

pub fn ny_fields() -> FieldValueMap {
    NY_FIELDS.into_iter().collect()
}
