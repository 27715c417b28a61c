/// VisualSFM NVM reader module.
pub mod nvm;
