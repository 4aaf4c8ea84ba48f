use crate::types::station::StationId;
use crate::types::zip_code::{ZipCode, ZipCodeMapping};

/// Stations whose ZIP code was checked by hand because reverse geocoding gets them wrong.
///
/// These always win over geocoded values.
pub const MANUAL_ZIP_CODE_OVERRIDES: &[(i64, &str)] = &[
    (150, "10009"),
    (151, "10012"),
    (216, "11201"),
    (217, "11201"),
    (250, "10012"),
    (252, "10011"),
    (265, "10002"),
    (298, "11217"),
    (367, "10022"),
    (386, "10013"),
    (387, "10007"),
    (391, "11201"),
    (392, "11201"),
    (400, "10002"),
    (422, "10023"),
    (434, "10011"),
    (455, "10017"),
    (473, "10002"),
    (479, "10036"),
    (501, "10016"),
    (509, "10011"),
    (514, "10018"),
    (516, "10017"),
    (530, "10069"),
    (536, "10016"),
    (3137, "10021"),
    (3141, "10065"),
    (3158, "10023"),
    (3160, "10024"),
    (3163, "10023"),
    (3292, "10029"),
    (3299, "10029"),
    (3309, "10029"),
    (3336, "10029"),
    (3341, "10025"),
    (3342, "11231"),
    (3343, "10025"),
    (3366, "10025"),
    (3383, "10025"),
    (3394, "11231"),
    (3443, "10104"),
    (3472, "10011"),
    (3541, "10027"),
    (3676, "11231"),
    (3686, "10014"),
    (3744, "10003"),
    (3746, "10013"),
    (3809, "10019"),
    (3921, "10454"),
    (3924, "10451"),
    (3942, "10027"),
    (3983, "10455"),
    (4045, "10069"),
    (4073, "10019"),
    (4090, "10451"),
    (4113, "10035"),
    (4115, "10035"),
    (4121, "10016"),
    (4136, "10451"),
    (3263, "10003"),
    (4478, "10003"),
];

/// Writes every manual override into `mapping`, replacing whatever was there.
pub fn overlay_overrides(mut mapping: ZipCodeMapping) -> ZipCodeMapping {
    mapping.extend(
        MANUAL_ZIP_CODE_OVERRIDES
            .iter()
            .map(|&(id, zip)| (StationId(id), ZipCode::new(zip))),
    );
    mapping
}
