mod provider_a;
mod provider_b;
mod provider_c;

pub use provider_a::ProviderA;
pub use provider_b::ProviderB;
pub use provider_c::ProviderC;
