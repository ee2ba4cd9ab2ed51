use crate::lnk::helpers::Guid;

/// Canonical name of a well-known property key (format id, property id).
pub fn property_name(format_id: &Guid, id: u32) -> Option<&'static str> {
    let name = match (format_id.to_string().as_str(), id) {
        // System.AppUserModel
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 2) => "System.AppUserModel.RelaunchCommand",
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 3) => "System.AppUserModel.RelaunchIconResource",
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 4) => {
            "System.AppUserModel.RelaunchDisplayNameResource"
        }
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 5) => "System.AppUserModel.ID",
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 6) => "System.AppUserModel.IsDestListSeparator",
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 8) => {
            "System.AppUserModel.ExcludeFromShowInNewInstall"
        }
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 9) => "System.AppUserModel.PreventPinning",
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 11) => "System.AppUserModel.IsDualMode",
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 12) => "System.AppUserModel.StartPinOption",
        ("9F4C2855-9F79-4B39-A8D0-E1D42DE1D5F3", 26) => "System.AppUserModel.ToastActivatorCLSID",

        // storage properties
        ("B725F130-47EF-101A-A5F1-02608C9EEBAC", 2) => "System.ItemFolderNameDisplay",
        ("B725F130-47EF-101A-A5F1-02608C9EEBAC", 4) => "System.ItemTypeText",
        ("B725F130-47EF-101A-A5F1-02608C9EEBAC", 10) => "System.ItemNameDisplay",
        ("B725F130-47EF-101A-A5F1-02608C9EEBAC", 12) => "System.Size",
        ("B725F130-47EF-101A-A5F1-02608C9EEBAC", 13) => "System.FileAttributes",
        ("B725F130-47EF-101A-A5F1-02608C9EEBAC", 14) => "System.DateModified",
        ("B725F130-47EF-101A-A5F1-02608C9EEBAC", 15) => "System.DateCreated",
        ("B725F130-47EF-101A-A5F1-02608C9EEBAC", 16) => "System.DateAccessed",

        // summary information
        ("F29F85E0-4FF9-1068-AB91-08002B27B3D9", 2) => "System.Title",
        ("F29F85E0-4FF9-1068-AB91-08002B27B3D9", 3) => "System.Subject",
        ("F29F85E0-4FF9-1068-AB91-08002B27B3D9", 4) => "System.Author",
        ("F29F85E0-4FF9-1068-AB91-08002B27B3D9", 5) => "System.Keywords",
        ("F29F85E0-4FF9-1068-AB91-08002B27B3D9", 6) => "System.Comment",

        ("28636AA6-953D-11D2-B5D6-00C04FD918D0", 30) => "System.ParsingPath",
        ("446D16B1-8DAD-4870-A748-402EA43D788C", 100) => "System.ThumbnailCacheId",
        ("446D16B1-8DAD-4870-A748-402EA43D788C", 104) => "System.VolumeId",
        ("B9B4B3FC-2B51-4A42-B5D8-324146AFCF25", 2) => "System.Link.TargetParsingPath",
        ("B9B4B3FC-2B51-4A42-B5D8-324146AFCF25", 8) => "System.Link.TargetSFGAOFlags",
        _ => return None,
    };
    Some(name)
}
