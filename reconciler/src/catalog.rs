//! Static operator catalog
//!
//! Every operator the integration knows how to present. Feed data decides
//! availability; this table supplies names, dial codes and artwork.

/// One operator in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOperator {
    /// Correspondent / provider code
    pub code: &'static str,
    /// Display name
    pub name: &'static str,
    /// Operator logo file
    pub image: &'static str,
}

/// One country in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCountry {
    /// Country name
    pub name: &'static str,
    /// ISO 3166 alpha-3 code, as used by the feeds
    pub iso3: &'static str,
    /// Settlement currency
    pub currency: &'static str,
    /// International dialling prefix
    pub dial_code: &'static str,
    /// Flag image file
    pub flag: &'static str,
    /// Operators in display order
    pub operators: &'static [CatalogOperator],
}

const fn op(code: &'static str, name: &'static str, image: &'static str) -> CatalogOperator {
    CatalogOperator { code, name, image }
}

const MTN: &str = "mtn.png";
const MOOV: &str = "moov.png";
const AIRTEL: &str = "airtel.png";
const ORANGE: &str = "orange-money-logo.jpg";
const VODACOM: &str = "vodacom.jpg";

/// All supported countries, alphabetical
#[rustfmt::skip]
pub static CATALOG: &[CatalogCountry] = &[
    CatalogCountry { name: "Benin", iso3: "BEN", currency: "XOF", dial_code: "+229", flag: "bj.png", operators: &[
        op("MTN_MOMO_BEN", "MTN Benin", MTN),
        op("MOOV_BEN", "Moov Benin", MOOV),
    ]},
    CatalogCountry { name: "Burkina Faso", iso3: "BFA", currency: "XOF", dial_code: "+226", flag: "bf.png", operators: &[
        op("ORANGE_BFA", "Orange Burkina Faso", ORANGE),
        op("MOOV_BFA", "Moov Burkina Faso", MOOV),
    ]},
    CatalogCountry { name: "Cameroon", iso3: "CMR", currency: "XAF", dial_code: "+237", flag: "cm.png", operators: &[
        op("MTN_MOMO_CMR", "MTN Cameroon", MTN),
        op("ORANGE_CMR", "Orange Cameroon", ORANGE),
    ]},
    CatalogCountry { name: "Congo", iso3: "COG", currency: "XAF", dial_code: "+242", flag: "cg.png", operators: &[
        op("AIRTEL_COG", "Airtel Congo", AIRTEL),
    ]},
    CatalogCountry { name: "Congo (DRC)", iso3: "COD", currency: "CDF", dial_code: "+243", flag: "cd.png", operators: &[
        op("VODACOM_MPESA_COD", "Vodacom DRC", VODACOM),
        op("AIRTEL_COD", "Airtel DRC", AIRTEL),
        op("ORANGE_COD", "Orange DRC", ORANGE),
    ]},
    CatalogCountry { name: "Cote D'Ivoire", iso3: "CIV", currency: "XOF", dial_code: "+225", flag: "ci.png", operators: &[
        op("MTN_MOMO_CIV", "MTN Cote d'Ivoire", MTN),
        op("ORANGE_CIV", "Orange Cote d'Ivoire", ORANGE),
        op("MOOV_CIV", "Moov Cote d'Ivoire", MOOV),
        op("WAVE_CIV", "Wave Cote d'Ivoire", "wave-logo.png"),
    ]},
    CatalogCountry { name: "Gabon", iso3: "GAB", currency: "XAF", dial_code: "+241", flag: "ga.png", operators: &[
        op("AIRTEL_GAB", "Airtel Gabon", AIRTEL),
        op("MOOV_GAB", "Moov Gabon", MOOV),
    ]},
    CatalogCountry { name: "Ghana", iso3: "GHA", currency: "GHS", dial_code: "+233", flag: "gh.png", operators: &[
        op("MTN_MOMO_GHA", "MTN Ghana", MTN),
        op("AIRTELTIGO_GHA", "AirtelTigo Ghana", "airtel-tigo.png"),
        op("VODAFONE_GHA", "Vodafone Ghana", VODACOM),
    ]},
    CatalogCountry { name: "Kenya", iso3: "KEN", currency: "KES", dial_code: "+254", flag: "ke.png", operators: &[
        op("MPESA_KEN", "Safaricom Kenya", "safaricom-logo.png"),
        op("AIRTEL_KEN", "Airtel Kenya", AIRTEL),
    ]},
    CatalogCountry { name: "Malawi", iso3: "MWI", currency: "MWK", dial_code: "+265", flag: "mw.png", operators: &[
        op("AIRTEL_MWI", "Airtel Malawi", AIRTEL),
        op("TNM_MWI", "TNM Malawi", "mw-tnm-logo.png"),
    ]},
    CatalogCountry { name: "Mozambique", iso3: "MOZ", currency: "MZN", dial_code: "+258", flag: "mz.png", operators: &[
        op("VODACOM_MOZ", "Vodacom Mozambique", VODACOM),
        op("MOVITEL_MOZ", "Movitel Mozambique", "movitel.png"),
    ]},
    CatalogCountry { name: "Nigeria", iso3: "NGA", currency: "NGN", dial_code: "+234", flag: "ng.png", operators: &[
        op("MTN_MOMO_NGA", "MTN Nigeria", MTN),
        op("AIRTEL_NGA", "Airtel Nigeria", AIRTEL),
    ]},
    CatalogCountry { name: "Rwanda", iso3: "RWA", currency: "RWF", dial_code: "+250", flag: "rw.png", operators: &[
        op("MTN_MOMO_RWA", "MTN Rwanda", MTN),
        op("AIRTEL_RWA", "Airtel Rwanda", AIRTEL),
    ]},
    CatalogCountry { name: "Senegal", iso3: "SEN", currency: "XOF", dial_code: "+221", flag: "sn.png", operators: &[
        op("ORANGE_SEN", "Orange Senegal", ORANGE),
        op("FREE_SEN", "Free Senegal", "free.png"),
    ]},
    CatalogCountry { name: "Sierra Leone", iso3: "SLE", currency: "SLE", dial_code: "+232", flag: "sl.png", operators: &[
        op("ORANGE_SLE", "Orange Sierra Leone", ORANGE),
        op("AFRICELL_SLE", "Africell Sierra Leone", "africell.png"),
    ]},
    CatalogCountry { name: "Tanzania", iso3: "TZA", currency: "TZS", dial_code: "+255", flag: "tz.png", operators: &[
        op("VODACOM_TZA", "Vodacom Tanzania", VODACOM),
        op("AIRTEL_TZA", "Airtel Tanzania", AIRTEL),
        op("TIGO_TZA", "Tigo Tanzania", "tigo-pesa-tanzania.png"),
        op("HALOTEL_TZA", "Halotel Tanzania", "halotel-tz.png"),
    ]},
    CatalogCountry { name: "Uganda", iso3: "UGA", currency: "UGX", dial_code: "+256", flag: "ug.png", operators: &[
        op("MTN_MOMO_UGA", "MTN Uganda", MTN),
        op("AIRTEL_OAPI_UGA", "Airtel Uganda", AIRTEL),
    ]},
    CatalogCountry { name: "Zambia", iso3: "ZMB", currency: "ZMW", dial_code: "+260", flag: "zm.png", operators: &[
        op("MTN_MOMO_ZMB", "MTN Zambia", MTN),
        op("AIRTEL_OAPI_ZMB", "Airtel Zambia", AIRTEL),
        op("ZAMTEL_ZMB", "Zamtel Zambia", "zamtel-za.png"),
    ]},
];

/// Look up an operator and its country by code
pub fn find_operator(code: &str) -> Option<(&'static CatalogCountry, &'static CatalogOperator)> {
    CATALOG.iter().find_map(|country| {
        country
            .operators
            .iter()
            .find(|op| op.code == code)
            .map(|op| (country, op))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_unique() {
        let codes: Vec<_> = CATALOG.iter().flat_map(|c| c.operators).map(|o| o.code).collect();
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len());
    }

    #[test]
    fn test_codes_end_with_country() {
        for country in CATALOG {
            for operator in country.operators {
                assert!(
                    operator.code.ends_with(country.iso3),
                    "{} is not in {}",
                    operator.code,
                    country.iso3
                );
            }
        }
    }

    #[test]
    fn test_find_operator() {
        let (country, operator) = find_operator("MPESA_KEN").unwrap();
        assert_eq!(country.currency, "KES");
        assert_eq!(operator.name, "Safaricom Kenya");
        assert!(find_operator("NOPE").is_none());
    }
}
