use std::fmt::Debug;

#[derive(Debug, Clone)]
pub struct PhoneNumberDomain(pub String);

impl PhoneNumberDomain{
    // Numbers are stored in international form, so a leading `+<country code>` is required
    pub fn parse(number: String) -> Result<PhoneNumberDomain, String>{
        match phonenumber::parse(None, &number) {
            Ok(parsed) if phonenumber::is_valid(&parsed) => {
                Ok(Self(parsed.format().mode(phonenumber::Mode::E164).to_string()))
            },
            _ => Err(format!("{} is not a valid phone number", number))
        }
    }

    pub fn inner(&self) -> String {
        self.0.clone()
    }
}

impl std::fmt::Display for PhoneNumberDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
