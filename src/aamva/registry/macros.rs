macro_rules! format_version {
	(@required required) => { true };
	(@required optional) => { false };
	(@max) => { None };
	(@max $max:literal) => { Some($max) };
	(@choices) => { $crate::aamva::registry::Choices::Inherit };
	(@choices [$($value:literal => $option:literal),*]) => {
		$crate::aamva::registry::Choices::Only(&[$(
			$crate::aamva::registry::EnumOption { value: $value, label: $option }
		),*])
	};
	($key:literal => $name:literal, $date_format:ident { $($code:ident : $ty:ident $(($max:literal))? $req:ident => $label:literal $([$($value:literal => $option:literal),* $(,)?])?),* $(,)? }) => {
		$crate::aamva::registry::VersionDeclaration {
			key: $key,
			name: $name,
			date_format: $crate::aamva::registry::DateFormat::$date_format,
			fields: &[$(
				$crate::aamva::registry::FieldDeclaration {
					code: stringify!($code),
					label: $label,
					ty: $crate::aamva::registry::FieldType::$ty,
					required: $crate::aamva::registry::format_version!(@required $req),
					max_len: $crate::aamva::registry::format_version!(@max $($max)?),
					choices: $crate::aamva::registry::format_version!(@choices $([$($value => $option),*])?),
				}
			),*],
		}
	};
}

macro_rules! enumerations {
	($($code:ident { $($value:literal => $label:literal),* $(,)? }),* $(,)?) => {
		&[$(
			(stringify!($code), &[$(
				$crate::aamva::registry::EnumOption { value: $value, label: $label }
			),*] as &[$crate::aamva::registry::EnumOption])
		),*]
	};
}

pub(crate) use enumerations;
pub(crate) use format_version;
