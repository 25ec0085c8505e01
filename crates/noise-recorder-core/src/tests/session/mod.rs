mod filename;
