use aamva_pdf417::{decode, Encoder, FieldValueMap, SchemaRegistry};

const FIELDS: &[(&str, &str)] = &[
    ("DAQ", "V12345678"),
    ("DCS", "Vera"),
    ("DAC", "Seán"),
    ("DBD", "01152024"),
    ("DBB", "01011990"),
    ("DBA", "12312030"),
    ("DBC", "2"),
    ("DAU", "065 IN"),
    ("DAY", "GRN"),
    ("DAG", "350 5th Ave"),
    ("DAI", "New York"),
    ("DAK", "10001-1234"),
];

fn main() {
    let fields: FieldValueMap = FIELDS.iter().copied().collect();
    let encoder = Encoder::standard();

    let bytes = encoder.encode("NY", "10", &fields).unwrap();
    eprintln!("payload ({} bytes): {}", bytes.len(), hex::encode(&bytes));

    let decoded = decode(SchemaRegistry::standard(), &bytes).unwrap();
    for (code, label, value) in decoded.labelled(SchemaRegistry::standard()) {
        eprintln!("{code} {label:<40} {value}");
    }

    let symbol = encoder.encode_symbol("NY", "10", &fields).unwrap();
    eprintln!(
        "symbol: {} rows, {} columns, {} modules wide",
        symbol.height(),
        symbol.columns(),
        symbol.width()
    );
    println!("{symbol}")
}
