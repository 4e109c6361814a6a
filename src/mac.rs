/// Lazily parses an environment variable into a specified type. If the environment variable is
/// not set, or parsing fails, the given default is used instead.
macro_rules! lazy_env_parse {
	($key:expr, $t:ty, $default:expr) => {
		once_cell::sync::Lazy::new(|| {
			std::env::var($key)
				.and_then(|s| Ok(s.parse::<$t>().unwrap_or($default)))
				.unwrap_or($default)
		})
	};
}

pub(crate) use lazy_env_parse;
